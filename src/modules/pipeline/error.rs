use thiserror::Error;

/// Errors raised while a job is processed. Everything except `Validation`
/// surfaces to callers as `PipelineOutcome::Failed` after local cleanup.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid job: {0}")]
    Validation(String),

    #[error("Failed to download {object} from {bucket}: {reason}")]
    RemoteFetch {
        bucket: String,
        object: String,
        reason: String,
    },

    #[error("Failed to upload {object} to {bucket}: {reason}")]
    RemoteUpload {
        bucket: String,
        object: String,
        reason: String,
    },

    #[error("Transcoding failed: {0}")]
    Transcode(String),

    #[error("Workspace unavailable: {0}")]
    Workspace(#[from] crate::infrastructure::workspace::WorkspaceError),
}
