//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement. The engine only ever talks to `Arc<dyn Storage>`, so upload
//! orchestration is independent of where the bytes actually live.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Per-file upload progress callback, invoked with a 0–100 percentage.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Storage abstraction trait
///
/// **Key format:** keys follow `{namespace}/{profileId}/{mediaKind}/{filename}`
/// where the filename embeds the asset id and an upload timestamp; see
/// [`crate::keys::media_storage_key`]. All backends must use this format.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a file to the given key and return its public URL.
    ///
    /// `on_progress` is invoked with a 0–100 percentage as bytes are written;
    /// backends without incremental progress report 100 once on completion.
    async fn upload(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
        on_progress: Option<ProgressCallback>,
    ) -> StorageResult<String>;

    /// Delete a file by its storage key. Idempotent: deleting a key that does
    /// not exist is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Resolve the public URL for a stored key, e.g. when a persisted record
    /// holds a path but the session no longer has a usable URL.
    async fn resolve_download_url(&self, storage_key: &str) -> StorageResult<String>;

    /// Get the size in bytes of an object, if it exists.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
