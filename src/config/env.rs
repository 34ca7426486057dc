use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    RawVideoBucket,
    ProcessedVideoBucket,
    LocalRawDir,
    LocalProcessedDir,
    S3Endpoint,
    S3Region,
    S3AccessKey,
    S3SecretKey,
    FfmpegPath,
    TranscodeTimeoutSecs,
    AmqpUrl,
    JobQueue,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "PORT",
            EnvKey::RawVideoBucket => "RAW_VIDEO_BUCKET",
            EnvKey::ProcessedVideoBucket => "PROCESSED_VIDEO_BUCKET",
            EnvKey::LocalRawDir => "LOCAL_RAW_DIR",
            EnvKey::LocalProcessedDir => "LOCAL_PROCESSED_DIR",
            EnvKey::S3Endpoint => "S3_ENDPOINT",
            EnvKey::S3Region => "S3_REGION",
            EnvKey::S3AccessKey => "AWS_ACCESS_KEY_ID",
            EnvKey::S3SecretKey => "AWS_SECRET_ACCESS_KEY",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
            EnvKey::TranscodeTimeoutSecs => "TRANSCODE_TIMEOUT_SECS",
            EnvKey::AmqpUrl => "AMQP_URL",
            EnvKey::JobQueue => "JOB_QUEUE",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

/// Unset and blank values both read as `None`.
pub fn get_opt(key: EnvKey) -> Option<String> {
    env::var(key.as_str()).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
