//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::ArtifactKey;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Workers persist pages concurrently, so implementations take `&self` and
/// must be shareable across tasks. Writes are async so a slow disk never
/// stalls a runtime worker thread.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Writes `body` under `key`, replacing anything stored there before
    ///
    /// # Returns
    ///
    /// The location the artifact was written to
    async fn persist(&self, key: &ArtifactKey, body: &[u8]) -> StorageResult<PathBuf>;
}
