use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::PipelineError;
use crate::infrastructure::storage::ObjectStorage;

/// Binds the object store to the raw input and processed output buckets.
#[derive(Clone)]
pub struct StoreGateway {
    storage: Arc<dyn ObjectStorage>,
    raw_bucket: String,
    processed_bucket: String,
}

impl StoreGateway {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        raw_bucket: impl Into<String>,
        processed_bucket: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            raw_bucket: raw_bucket.into(),
            processed_bucket: processed_bucket.into(),
        }
    }

    pub async fn download_raw(
        &self,
        object_name: &str,
        destination: &Path,
    ) -> Result<PathBuf, PipelineError> {
        info!("⬇️ Downloading {}/{}", self.raw_bucket, object_name);

        self.storage
            .download_to_file(&self.raw_bucket, object_name, destination)
            .await
            .map_err(|e| PipelineError::RemoteFetch {
                bucket: self.raw_bucket.clone(),
                object: object_name.to_string(),
                reason: e.to_string(),
            })?;

        info!("⬇️ Downloaded to {}", destination.display());
        Ok(destination.to_path_buf())
    }

    /// Uploads then makes the object public. If the second call fails the
    /// object stays in the bucket but the upload is still reported as failed.
    pub async fn upload_processed(
        &self,
        source: &Path,
        object_name: &str,
    ) -> Result<(), PipelineError> {
        let upload_error = |reason: String| PipelineError::RemoteUpload {
            bucket: self.processed_bucket.clone(),
            object: object_name.to_string(),
            reason,
        };

        let content_type = mime_guess::from_path(source)
            .first_or_octet_stream()
            .to_string();

        info!("⬆️ Uploading {} to {}", object_name, self.processed_bucket);
        self.storage
            .upload_from_file(&self.processed_bucket, object_name, source, &content_type)
            .await
            .map_err(|e| upload_error(e.to_string()))?;

        if let Err(e) = self
            .storage
            .make_public(&self.processed_bucket, object_name)
            .await
        {
            warn!(
                "{} was uploaded to {} but is not public",
                object_name, self.processed_bucket
            );
            return Err(upload_error(e.to_string()));
        }

        info!("⬆️ Published {}/{}", self.processed_bucket, object_name);
        Ok(())
    }
}
