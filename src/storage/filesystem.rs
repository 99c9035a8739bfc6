//! Flat-directory storage backend
//!
//! Every artifact becomes one file directly inside the destination directory.

use super::traits::{Storage, StorageError, StorageResult};
use super::ArtifactKey;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes artifacts as files under a single destination directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Opens a storage rooted at an existing directory
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotADirectory` if `root` does not name a directory.
    pub fn new(root: &Path) -> StorageResult<Self> {
        if !root.is_dir() {
            return Err(StorageError::NotADirectory(root.to_path_buf()));
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Full path an artifact with this key is written to
    pub fn path_for(&self, key: &ArtifactKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn persist(&self, key: &ArtifactKey, body: &[u8]) -> StorageResult<PathBuf> {
        let path = self.path_for(key);

        tokio::fs::write(&path, body)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        debug!("Wrote {} bytes to {}", body.len(), path.display());
        Ok(path)
    }
}
