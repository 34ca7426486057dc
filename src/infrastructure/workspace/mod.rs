//! Local staging directories for raw downloads and transcoded output.
//!
//! File names inside the directories are the remote object names with path
//! separators escaped (see [`local_file_name`]), so two jobs for different
//! objects never share a staged path. Two deliveries of the same object do.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

#[derive(Debug, Error)]
#[error("Failed to create staging directory {}: {source}", .path.display())]
pub struct WorkspaceError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// A staged file that could not be removed. Logged, never escalated.
#[derive(Debug, Error)]
#[error("Failed to delete {}: {source}", .path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketRole {
    Raw,
    Processed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub local_path: PathBuf,
    pub remote_object_name: String,
    pub role: BucketRole,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
}

impl Workspace {
    pub fn new(raw_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    pub fn dir(&self, role: BucketRole) -> &Path {
        match role {
            BucketRole::Raw => &self.raw_dir,
            BucketRole::Processed => &self.processed_dir,
        }
    }

    /// Creates both staging directories. Safe to call concurrently and
    /// repeatedly; `create_dir_all` treats an existing directory as success.
    pub async fn ensure(&self) -> Result<(), WorkspaceError> {
        for dir in [&self.raw_dir, &self.processed_dir] {
            fs::create_dir_all(dir).await.map_err(|source| WorkspaceError {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn path_for(&self, role: BucketRole, file_name: &str) -> PathBuf {
        self.dir(role).join(file_name)
    }

    pub fn stage(&self, role: BucketRole, object_name: &str) -> StagedFile {
        StagedFile {
            local_path: self.path_for(role, &local_file_name(object_name)),
            remote_object_name: object_name.to_string(),
            role,
        }
    }

    /// Removes `path` if it exists. A missing file is not an error.
    pub async fn delete_if_present(&self, path: &Path) -> Result<(), CleanupError> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted staged file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CleanupError {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Best-effort removal of every staged file. Returns how many deletes failed.
    pub async fn cleanup(&self, files: &[&StagedFile]) -> usize {
        let mut failures = 0;
        for file in files {
            if let Err(e) = self.delete_if_present(&file.local_path).await {
                warn!(object = %file.remote_object_name, role = ?file.role, "{}", e);
                failures += 1;
            }
        }
        failures
    }
}

/// Maps an object key onto a single file name. Plain names are kept as is;
/// `%`, `/`, `\` and NUL are percent-escaped, and the names `.` and `..` have
/// their dots escaped. Distinct keys always map to distinct names.
pub fn local_file_name(object_name: &str) -> String {
    if object_name == "." || object_name == ".." {
        return object_name.replace('.', "%2E");
    }

    let mut name = String::with_capacity(object_name.len());
    for c in object_name.chars() {
        match c {
            '%' => name.push_str("%25"),
            '/' => name.push_str("%2F"),
            '\\' => name.push_str("%5C"),
            '\0' => name.push_str("%00"),
            c => name.push(c),
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace(root: &TempDir) -> Workspace {
        Workspace::new(root.path().join("raw"), root.path().join("processed"))
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let root = TempDir::new().unwrap();
        let ws = workspace(&root);

        ws.ensure().await.unwrap();
        ws.ensure().await.unwrap();

        assert!(root.path().join("raw").is_dir());
        assert!(root.path().join("processed").is_dir());
    }

    #[tokio::test]
    async fn concurrent_ensure_does_not_race() {
        let root = TempDir::new().unwrap();
        let ws = workspace(&root);

        let (a, b) = tokio::join!(ws.ensure(), ws.ensure());
        a.unwrap();
        b.unwrap();
    }

    #[tokio::test]
    async fn ensure_fails_when_path_is_a_file() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("raw"), b"x").unwrap();
        let ws = workspace(&root);

        let err = ws.ensure().await.unwrap_err();
        assert_eq!(err.path, root.path().join("raw"));
    }

    #[test]
    fn paths_are_scoped_by_role_and_name() {
        let ws = Workspace::new("./raw-videos", "./processed-videos");

        assert_eq!(
            ws.path_for(BucketRole::Raw, "clip.mp4"),
            PathBuf::from("./raw-videos/clip.mp4")
        );
        let staged = ws.stage(BucketRole::Processed, "processed-clip.mp4");
        assert_eq!(staged.local_path, PathBuf::from("./processed-videos/processed-clip.mp4"));
        assert_eq!(staged.role, BucketRole::Processed);
        assert_ne!(
            ws.path_for(BucketRole::Raw, "a.mp4"),
            ws.path_for(BucketRole::Raw, "b.mp4")
        );
    }

    #[test]
    fn object_keys_flatten_into_the_staging_dir() {
        assert_eq!(local_file_name("clip.mp4"), "clip.mp4");
        assert_eq!(local_file_name("uploads/clip.mp4"), "uploads%2Fclip.mp4");
        assert_eq!(local_file_name("../etc/passwd"), "..%2Fetc%2Fpasswd");
        assert_eq!(local_file_name(".."), "%2E%2E");
        assert_eq!(local_file_name("a\\b"), "a%5Cb");
        assert_ne!(local_file_name("a/b"), local_file_name("a%2Fb"));

        let ws = Workspace::new("./raw-videos", "./processed-videos");
        let staged = ws.stage(BucketRole::Raw, "uploads/clip.mp4");
        assert_eq!(staged.local_path, PathBuf::from("./raw-videos/uploads%2Fclip.mp4"));
        assert_eq!(staged.remote_object_name, "uploads/clip.mp4");
    }

    #[tokio::test]
    async fn delete_if_present_is_idempotent() {
        let root = TempDir::new().unwrap();
        let ws = workspace(&root);
        ws.ensure().await.unwrap();
        let path = ws.path_for(BucketRole::Raw, "clip.mp4");
        std::fs::write(&path, b"data").unwrap();

        ws.delete_if_present(&path).await.unwrap();
        ws.delete_if_present(&path).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn delete_reports_non_missing_failures() {
        let root = TempDir::new().unwrap();
        let ws = workspace(&root);
        ws.ensure().await.unwrap();
        // A directory cannot be removed with remove_file.
        let dir = ws.path_for(BucketRole::Raw, "not-a-file");
        std::fs::create_dir(&dir).unwrap();

        assert!(ws.delete_if_present(&dir).await.is_err());
        let staged = ws.stage(BucketRole::Raw, "not-a-file");
        assert_eq!(ws.cleanup(&[&staged]).await, 1);
    }
}
