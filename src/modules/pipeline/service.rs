use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};
use validator::Validate;

use super::error::PipelineError;
use super::gateway::StoreGateway;
use super::job::JobDescriptor;
use super::transcoder::{TranscodeResult, Transcoder};
use crate::infrastructure::workspace::{BucketRole, StagedFile, Workspace};

/// Result handed back to whichever front door delivered the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed,
    /// Malformed job. Nothing was staged or fetched.
    Rejected(String),
    /// A step failed after validation. Local staging has already been cleaned.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validated,
    Downloaded,
    Transcoded,
    Uploaded,
    CleanedUp,
}

/// Download → transcode → upload for one object, with unconditional cleanup.
///
/// Jobs share nothing but the staging directories, so a single service can
/// run any number of distinct jobs concurrently. Staged paths derive from the
/// object name only: two concurrent deliveries of the same object share them,
/// and whichever finishes first deletes the other's files.
#[derive(Clone)]
pub struct PipelineService {
    workspace: Workspace,
    gateway: StoreGateway,
    transcoder: Arc<dyn Transcoder>,
}

impl PipelineService {
    pub fn new(workspace: Workspace, gateway: StoreGateway, transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            workspace,
            gateway,
            transcoder,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Decodes a raw trigger payload and runs the job it names.
    pub async fn handle(&self, payload: &[u8]) -> PipelineOutcome {
        match JobDescriptor::from_payload(payload) {
            Ok(job) => self.run(&job).await,
            Err(e) => {
                warn!("Rejected job: {}", e);
                PipelineOutcome::Rejected(e.to_string())
            }
        }
    }

    /// Runs the job on its own task and waits for it. Dropping the returned
    /// future does not stop the job, so cleanup still happens when the
    /// caller goes away mid-run.
    pub async fn run_detached(self: Arc<Self>, job: JobDescriptor) -> PipelineOutcome {
        let handle = tokio::spawn(async move { self.run(&job).await });
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("❌ Job task ended abnormally: {}", e);
                PipelineOutcome::Failed(format!("job task ended abnormally: {}", e))
            }
        }
    }

    pub async fn run(&self, job: &JobDescriptor) -> PipelineOutcome {
        if let Err(e) = job.validate() {
            let reason = PipelineError::Validation(e.to_string()).to_string();
            warn!("Rejected job: {}", reason);
            return PipelineOutcome::Rejected(reason);
        }

        let span = info_span!("job", object = %job.object_name);
        async {
            info!(stage = ?Stage::Validated, "Processing job");

            let raw = self.workspace.stage(BucketRole::Raw, &job.object_name);
            let processed = self
                .workspace
                .stage(BucketRole::Processed, &job.output_object_name());

            let result = self.process(&raw, &processed).await;

            let failed_deletes = self.workspace.cleanup(&[&raw, &processed]).await;
            if failed_deletes > 0 {
                warn!("{} staged file(s) could not be removed", failed_deletes);
            }
            info!(stage = ?Stage::CleanedUp, "Local staging cleared");

            match result {
                Ok(()) => {
                    info!("✅ Job completed");
                    PipelineOutcome::Completed
                }
                Err(e) => {
                    error!("❌ Job failed: {}", e);
                    PipelineOutcome::Failed(e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn process(&self, raw: &StagedFile, processed: &StagedFile) -> Result<(), PipelineError> {
        self.workspace.ensure().await?;

        self.gateway
            .download_raw(&raw.remote_object_name, &raw.local_path)
            .await?;
        info!(stage = ?Stage::Downloaded);

        match self
            .transcoder
            .transcode(&raw.local_path, &processed.local_path)
            .await
        {
            TranscodeResult::Success => info!(stage = ?Stage::Transcoded),
            TranscodeResult::Failure(reason) => return Err(PipelineError::Transcode(reason)),
        }

        self.gateway
            .upload_processed(&processed.local_path, &processed.remote_object_name)
            .await?;
        info!(stage = ?Stage::Uploaded);

        Ok(())
    }
}
