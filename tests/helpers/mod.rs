//! In-memory collaborators for driving the pipeline without S3 or ffmpeg.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Barrier;

use video_processing_service::infrastructure::storage::{ObjectStorage, StorageError, StorageResult};
use video_processing_service::infrastructure::workspace::Workspace;
use video_processing_service::modules::pipeline::gateway::StoreGateway;
use video_processing_service::modules::pipeline::service::PipelineService;
use video_processing_service::modules::pipeline::transcoder::{TranscodeResult, Transcoder};

pub const RAW_BUCKET: &str = "raw-videos-test";
pub const PROCESSED_BUCKET: &str = "processed-videos-test";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    Normal,
    /// Writes half of the object, then fails.
    Interrupted,
}

#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    public: Mutex<HashSet<(String, String)>>,
    calls: Mutex<Vec<String>>,
    interrupted_download: Mutex<bool>,
    fail_upload: Mutex<bool>,
    fail_make_public: Mutex<bool>,
    pin_uploaded_source: Mutex<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, bucket: &str, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data.to_vec());
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn is_public(&self, bucket: &str, key: &str) -> bool {
        self.public
            .lock()
            .unwrap()
            .contains(&(bucket.to_string(), key.to_string()))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_download_mode(&self, mode: DownloadMode) {
        *self.interrupted_download.lock().unwrap() = mode == DownloadMode::Interrupted;
    }

    pub fn fail_upload(&self) {
        *self.fail_upload.lock().unwrap() = true;
    }

    /// After reading an upload's source, swaps it for a non-empty directory
    /// so the local delete afterwards fails.
    pub fn pin_uploaded_source(&self) {
        *self.pin_uploaded_source.lock().unwrap() = true;
    }

    pub fn fail_make_public(&self) {
        *self.fail_make_public.lock().unwrap() = true;
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn download_to_file(&self, bucket: &str, key: &str, destination: &Path) -> StorageResult<()> {
        self.record(format!("download {}/{}", bucket, key));

        let data = self.get(bucket, key).ok_or_else(|| StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;

        if *self.interrupted_download.lock().unwrap() {
            tokio::fs::write(destination, &data[..data.len() / 2]).await?;
            return Err(StorageError::Transfer("connection reset".to_string()));
        }

        tokio::fs::write(destination, &data).await?;
        Ok(())
    }

    async fn upload_from_file(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
        _content_type: &str,
    ) -> StorageResult<()> {
        self.record(format!("upload {}/{}", bucket, key));

        let data = tokio::fs::read(source).await?;
        if *self.pin_uploaded_source.lock().unwrap() {
            tokio::fs::remove_file(source).await?;
            tokio::fs::create_dir(source).await?;
            tokio::fs::write(source.join("keep"), b"x").await?;
        }
        if *self.fail_upload.lock().unwrap() {
            return Err(StorageError::Transfer("upload rejected".to_string()));
        }
        self.put(bucket, key, &data);
        Ok(())
    }

    async fn make_public(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.record(format!("make_public {}/{}", bucket, key));

        if *self.fail_make_public.lock().unwrap() {
            return Err(StorageError::Visibility("access denied".to_string()));
        }
        self.public
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeMode {
    /// Writes `scaled:` followed by the input bytes.
    Succeed,
    Fail,
    /// Leaves a truncated output file behind before failing.
    FailWithPartialOutput,
}

#[derive(Debug, Clone)]
pub struct TranscodeCall {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_contents: Vec<u8>,
}

pub struct FakeTranscoder {
    mode: TranscodeMode,
    calls: Mutex<Vec<TranscodeCall>>,
    barrier: Option<Arc<Barrier>>,
    delay: Option<Duration>,
}

impl FakeTranscoder {
    pub fn new(mode: TranscodeMode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
            barrier: None,
            delay: None,
        }
    }

    /// Holds every transcode until `parties` of them are in flight.
    pub fn with_barrier(mode: TranscodeMode, parties: usize) -> Self {
        Self {
            barrier: Some(Arc::new(Barrier::new(parties))),
            ..Self::new(mode)
        }
    }

    /// Takes `delay` to finish, after writing its output.
    pub fn slow(mode: TranscodeMode, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(mode)
        }
    }

    pub fn calls(&self) -> Vec<TranscodeCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> TranscodeResult {
        let input_contents = match tokio::fs::read(input).await {
            Ok(data) => data,
            Err(e) => return TranscodeResult::Failure(format!("cannot read input: {}", e)),
        };

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        self.calls.lock().unwrap().push(TranscodeCall {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            input_contents: input_contents.clone(),
        });

        match self.mode {
            TranscodeMode::Succeed => {
                let mut scaled = b"scaled:".to_vec();
                scaled.extend_from_slice(&input_contents);
                if let Err(e) = tokio::fs::write(output, scaled).await {
                    return TranscodeResult::Failure(e.to_string());
                }
                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                TranscodeResult::Success
            }
            TranscodeMode::Fail => TranscodeResult::Failure("Invalid data found when processing input".to_string()),
            TranscodeMode::FailWithPartialOutput => {
                let _ = tokio::fs::write(output, b"scal").await;
                TranscodeResult::Failure("Conversion failed!".to_string())
            }
        }
    }
}

pub struct TestPipeline {
    pub root: TempDir,
    pub storage: Arc<MemoryStorage>,
    pub transcoder: Arc<FakeTranscoder>,
    pub service: PipelineService,
}

impl TestPipeline {
    pub fn new(transcoder: FakeTranscoder) -> Self {
        let root = TempDir::new().unwrap();
        let storage = Arc::new(MemoryStorage::new());
        let transcoder = Arc::new(transcoder);

        let workspace = Workspace::new(root.path().join("raw-videos"), root.path().join("processed-videos"));
        let gateway = StoreGateway::new(storage.clone(), RAW_BUCKET, PROCESSED_BUCKET);
        let service = PipelineService::new(workspace, gateway, transcoder.clone());

        Self {
            root,
            storage,
            transcoder,
            service,
        }
    }

    pub fn raw_path(&self, name: &str) -> PathBuf {
        self.root.path().join("raw-videos").join(name)
    }

    pub fn processed_path(&self, name: &str) -> PathBuf {
        self.root.path().join("processed-videos").join(name)
    }

    /// Every regular file left under the staging root.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for dir in ["raw-videos", "processed-videos"] {
            if let Ok(entries) = std::fs::read_dir(self.root.path().join(dir)) {
                files.extend(entries.flatten().map(|e| e.path()));
            }
        }
        files
    }
}
