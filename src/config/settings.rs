use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use crate::config::env::{self, EnvKey};

pub const DEFAULT_RAW_VIDEO_BUCKET: &str = "yt-raw-videos";
pub const DEFAULT_PROCESSED_VIDEO_BUCKET: &str = "yt-processed-videos";
pub const DEFAULT_LOCAL_RAW_DIR: &str = "./raw-videos";
pub const DEFAULT_LOCAL_PROCESSED_DIR: &str = "./processed-videos";
pub const DEFAULT_JOB_QUEUE: &str = "raw_video_uploads";

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub raw_bucket: String,
    pub processed_bucket: String,
    pub local_raw_dir: PathBuf,
    pub local_processed_dir: PathBuf,
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub ffmpeg_path: String,
    pub transcode_timeout_secs: Option<u64>,
    pub amqp_url: Option<String>,
    pub job_queue: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            raw_bucket: env::get_or(EnvKey::RawVideoBucket, DEFAULT_RAW_VIDEO_BUCKET),
            processed_bucket: env::get_or(
                EnvKey::ProcessedVideoBucket,
                DEFAULT_PROCESSED_VIDEO_BUCKET,
            ),
            local_raw_dir: env::get_or(EnvKey::LocalRawDir, DEFAULT_LOCAL_RAW_DIR).into(),
            local_processed_dir: env::get_or(
                EnvKey::LocalProcessedDir,
                DEFAULT_LOCAL_PROCESSED_DIR,
            )
            .into(),
            s3_endpoint: env::get_opt(EnvKey::S3Endpoint),
            s3_region: env::get_or(EnvKey::S3Region, "us-east-1"),
            s3_access_key: env::get(EnvKey::S3AccessKey)?,
            s3_secret_key: env::get(EnvKey::S3SecretKey)?,
            ffmpeg_path: env::get_or(EnvKey::FfmpegPath, "ffmpeg"),
            transcode_timeout_secs: env::get_opt(EnvKey::TranscodeTimeoutSecs)
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0),
            amqp_url: env::get_opt(EnvKey::AmqpUrl),
            job_queue: env::get_or(EnvKey::JobQueue, DEFAULT_JOB_QUEUE),
        })
    }

    pub fn transcode_timeout(&self) -> Option<Duration> {
        self.transcode_timeout_secs.map(Duration::from_secs)
    }
}
