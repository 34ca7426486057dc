pub mod s3;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Failed to change object visibility: {0}")]
    Visibility(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Primitive object-storage operations the pipeline is built on.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Streams `bucket/key` into `destination`, replacing any existing file.
    async fn download_to_file(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> StorageResult<()>;

    async fn upload_from_file(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Grants anonymous read access to an existing object.
    async fn make_public(&self, bucket: &str, key: &str) -> StorageResult<()>;
}
