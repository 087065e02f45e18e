//! Transient working directory for intermediate artifacts.
//!
//! The directory is wiped at the start of every assembly call. It is not
//! locked: at most one assembly may use a given directory at a time.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::error::MediaResult;

/// Working directory owned by one assembler.
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Remove stale files from a previous run and recreate the directory.
    ///
    /// Deletion errors are ignored; only failure to recreate is reported.
    pub async fn reset(&self) -> MediaResult<()> {
        if let Err(e) = fs::remove_dir_all(&self.root).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(
                    "Ignoring failure to clear work dir {}: {}",
                    self.root.display(),
                    e
                );
            }
        }
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Unique file path inside the directory, e.g. `reel-<uuid>.mp4`.
    pub fn file(&self, prefix: &str, extension: &str) -> PathBuf {
        self.root
            .join(format!("{}-{}.{}", prefix, Uuid::new_v4().simple(), extension))
    }

    /// Write bytes to a fresh file and return its path.
    pub async fn write(&self, prefix: &str, extension: &str, bytes: &[u8]) -> MediaResult<PathBuf> {
        let path = self.file(prefix, extension);
        fs::write(&path, bytes).await?;
        Ok(path)
    }
}
