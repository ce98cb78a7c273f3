//! Shared test fixtures: an in-memory recording storage backend (optionally
//! gated so tests can control upload interleaving), stub thumbnailers, and
//! session construction shortcuts.
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use uuid::Uuid;

use greenroom_core::{Draft, PendingFile, WizardConfig};
use greenroom_docstore::{DraftStore, MemoryDraftStore};
use greenroom_engine::thumbnail::{ThumbnailGenerator, ThumbnailImage};
use greenroom_engine::{NoopSizeProbe, WizardSession};
use greenroom_storage::{ProgressCallback, Storage, StorageError, StorageResult};

/// In-memory storage that records every upload and delete. When gated, each
/// upload waits for one semaphore permit before transferring, letting tests
/// interleave concurrent batches deterministically.
pub struct TestStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl TestStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            files: Mutex::new(HashMap::new()),
            uploads: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    /// A storage whose uploads block until the returned semaphore is given
    /// permits, one permit per upload.
    pub fn gated() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let storage = Arc::new(Self {
            files: Mutex::new(HashMap::new()),
            uploads: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            gate: Some(gate.clone()),
        });
        (storage, gate)
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn url_for(key: &str) -> String {
        format!("https://media.test/{}", key)
    }
}

#[async_trait]
impl Storage for TestStorage {
    async fn upload(
        &self,
        storage_key: &str,
        _content_type: &str,
        data: Bytes,
        on_progress: Option<ProgressCallback>,
    ) -> StorageResult<String> {
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| StorageError::BackendError(e.to_string()))?
                .forget();
        }
        if let Some(progress) = &on_progress {
            progress(50.0);
        }
        self.files
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data.to_vec());
        self.uploads.lock().unwrap().push(storage_key.to_string());
        if let Some(progress) = &on_progress {
            progress(100.0);
        }
        Ok(Self::url_for(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.deletes.lock().unwrap().push(storage_key.to_string());
        self.files.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn resolve_download_url(&self, storage_key: &str) -> StorageResult<String> {
        Ok(Self::url_for(storage_key))
    }

    async fn content_length(&self, storage_key: &str) -> StorageResult<u64> {
        self.files
            .lock()
            .unwrap()
            .get(storage_key)
            .map(|data| data.len() as u64)
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(storage_key))
    }
}

/// Thumbnailer returning a fixed frame.
pub struct StubThumbnailer {
    pub bytes: &'static [u8],
}

#[async_trait]
impl ThumbnailGenerator for StubThumbnailer {
    async fn generate(&self, _video: &[u8]) -> anyhow::Result<ThumbnailImage> {
        Ok(ThumbnailImage {
            bytes: Bytes::from_static(self.bytes),
            width: 16,
            height: 9,
            content_type: "image/png",
        })
    }
}

/// Thumbnailer that always fails.
pub struct FailingThumbnailer;

#[async_trait]
impl ThumbnailGenerator for FailingThumbnailer {
    async fn generate(&self, _video: &[u8]) -> anyhow::Result<ThumbnailImage> {
        Err(anyhow::anyhow!("no decodable frames"))
    }
}

pub fn audio_file(name: &str, len: usize) -> PendingFile {
    PendingFile::new(name, "audio/mpeg", vec![0u8; len])
}

pub fn image_file(name: &str, len: usize) -> PendingFile {
    PendingFile::new(name, "image/jpeg", vec![0u8; len])
}

pub fn video_file(name: &str, len: usize) -> PendingFile {
    PendingFile::new(name, "video/mp4", vec![0u8; len])
}

/// Create the draft in the store and open a session over it.
pub async fn session_for(
    draft: Draft,
    storage: Arc<TestStorage>,
    store: Arc<MemoryDraftStore>,
    thumbnailer: Arc<dyn ThumbnailGenerator>,
) -> WizardSession {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    store.create_draft(draft.clone()).await.unwrap();
    WizardSession::from_draft(
        draft,
        WizardConfig::default(),
        storage,
        store,
        thumbnailer,
        Arc::new(NoopSizeProbe),
    )
    .await
}

/// Poll until a condition holds, failing the test after ~5 seconds.
pub async fn wait_until(description: &str, condition: impl Fn() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {}", description);
}

/// A draft resumable at the given step, with a stage name already set so the
/// name gate does not interfere with media-step tests.
pub fn draft_at(step: greenroom_core::WizardStep) -> Draft {
    let mut draft = Draft::new(Uuid::new_v4());
    draft.name = "The Strides".to_string();
    draft.last_stage = step;
    draft
}
