use async_trait::async_trait;
use std::path::Path;

/// Output height for every transcode. Width follows the source aspect ratio.
pub const TARGET_HEIGHT: u32 = 360;

/// Terminal event of a single transcode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeResult {
    Success,
    Failure(String),
}

/// Converts a staged input file into a staged output file.
///
/// Implementations resolve exactly once per call. On `Failure` the output
/// file may or may not exist.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, input: &Path, output: &Path) -> TranscodeResult;
}
