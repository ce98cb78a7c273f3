//! Blob storage abstraction for profile media.
//!
//! Defines the [`Storage`] trait the engine consumes, the shared storage-key
//! format (see [`keys`]), and a local-filesystem backend.

pub mod keys;
pub mod local;
pub mod traits;

pub use keys::{media_storage_key, parse_key_timestamp, MediaKind};
pub use local::LocalStorage;
pub use traits::{ProgressCallback, Storage, StorageError, StorageResult};
