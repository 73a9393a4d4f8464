//! Host save primitive.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::error::DownloadError;
use super::filename::resolve_unique_path;

/// Attempts at claiming a free name before giving up on concurrent writers.
const MAX_CREATE_ATTEMPTS: usize = 32;

/// Where downloaded bytes end up.
#[async_trait]
pub trait AssetSink: Send + Sync {
    /// Saves `bytes` under (a variant of) `filename` and returns the final path.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError>;
}

/// Saves assets into a directory, never overwriting existing files.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Creates a sink writing into `dir` (created on first save).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl AssetSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DownloadError::io(self.dir.clone(), e))?;

        let (path, mut file) = create_unique(&self.dir, filename).await?;

        let written = match file.write_all(bytes).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            // Don't leave a truncated file behind.
            let _ = fs::remove_file(&path).await;
            return Err(DownloadError::io(path, e));
        }

        debug!(path = %path.display(), bytes = bytes.len(), "asset saved");
        Ok(path)
    }
}

/// Claims a free variant of `filename` in `dir`.
///
/// Another writer may take the resolved name between the existence check and
/// the `create_new` open; that name is then skipped and the next one tried.
async fn create_unique(dir: &Path, filename: &str) -> Result<(PathBuf, fs::File), DownloadError> {
    let mut attempt = 1;
    loop {
        let path = resolve_unique_path(dir, filename);
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_CREATE_ATTEMPTS => {
                debug!(path = %path.display(), attempt, "name taken concurrently, retrying");
                attempt += 1;
            }
            Err(e) => return Err(DownloadError::io(path, e)),
        }
    }
}
