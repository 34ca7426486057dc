use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::modules::pipeline::transcoder::{TARGET_HEIGHT, TranscodeResult, Transcoder};

const STDERR_TAIL_LINES: usize = 5;

/// Runs the `ffmpeg` binary as a child process.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: String,
    timeout: Option<Duration>,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// `-2` lets ffmpeg pick an even width that keeps the aspect ratio.
    /// Progress stats are suppressed so captured stderr only holds errors.
    fn args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-nostats".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-vf".to_string(),
            format!("scale=-2:{}", TARGET_HEIGHT),
            output.display().to_string(),
        ]
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(Self::args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> TranscodeResult {
        info!(input = %input.display(), output = %output.display(), "Starting ffmpeg");

        let child = match self.command(input, output).spawn() {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to spawn {}: {}", self.binary, e);
                return TranscodeResult::Failure(format!("failed to start {}: {}", self.binary, e));
            }
        };

        // Dropping the future on timeout drops the child, which kills it.
        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    error!("ffmpeg timed out after {:?}", limit);
                    return TranscodeResult::Failure(format!("timed out after {:?}", limit));
                }
            },
            None => child.wait_with_output().await,
        };

        match waited {
            Ok(out) if out.status.success() => {
                info!(output = %output.display(), "Video processing finished successfully");
                TranscodeResult::Success
            }
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                debug!("ffmpeg stderr: {}", stderr);
                let reason = format!(
                    "ffmpeg exited with {}: {}",
                    out.status,
                    stderr_tail(&stderr)
                );
                error!("{}", reason);
                TranscodeResult::Failure(reason)
            }
            Err(e) => {
                error!("Failed waiting for ffmpeg: {}", e);
                TranscodeResult::Failure(format!("failed waiting for ffmpeg: {}", e))
            }
        }
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}
