//! Storage path lifecycle tracking.
//!
//! Per asset slot, remembers the last persisted remote path so that a
//! replacement upload can garbage-collect the blob it superseded. Deletion is
//! strictly delete-after-replace: a path is only removed once a different
//! path has been confirmed in its place, and deletion failures are logged and
//! swallowed (an orphaned blob costs storage, not correctness).

use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use greenroom_storage::{MediaKind, Storage};

#[derive(Debug, Default)]
pub struct StoragePathTracker {
    paths: Mutex<HashMap<(Uuid, MediaKind), String>>,
}

impl StoragePathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the confirmed path for a slot and return the one it replaced.
    pub fn record_new_path(
        &self,
        asset_id: Uuid,
        kind: MediaKind,
        path: &str,
    ) -> Option<String> {
        let mut paths = self.paths.lock().expect("path tracker lock poisoned");
        paths.insert((asset_id, kind), path.to_string())
    }

    /// The currently recorded path for a slot, if any.
    pub fn current_path(&self, asset_id: Uuid, kind: MediaKind) -> Option<String> {
        let paths = self.paths.lock().expect("path tracker lock poisoned");
        paths.get(&(asset_id, kind)).cloned()
    }

    /// Drop all entries for an asset, returning the paths that were recorded.
    /// Used when the asset itself is removed from the draft.
    pub fn forget_asset(&self, asset_id: Uuid) -> Vec<String> {
        let mut paths = self.paths.lock().expect("path tracker lock poisoned");
        let keys: Vec<(Uuid, MediaKind)> = paths
            .keys()
            .filter(|(id, _)| *id == asset_id)
            .copied()
            .collect();
        keys.into_iter().filter_map(|key| paths.remove(&key)).collect()
    }
}

/// Delete a superseded path if it exists and differs from its replacement.
/// Never called with the replacement path itself.
pub async fn maybe_delete_orphan(storage: &dyn Storage, previous: Option<&str>, new_path: &str) {
    let Some(previous) = previous else {
        return;
    };
    if previous == new_path {
        return;
    }
    delete_orphan(storage, previous).await;
}

/// Best-effort storage delete: failures are logged and swallowed.
pub async fn delete_orphan(storage: &dyn Storage, path: &str) {
    match storage.delete(path).await {
        Ok(()) => {
            tracing::debug!(storage_path = %path, "Deleted orphaned storage path");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                storage_path = %path,
                "Failed to delete orphaned storage path, continuing"
            );
        }
    }
}
