//! Debounced draft field writes.
//!
//! One scheduler for every auto-saved text/slider field, keyed by field name
//! with cancel-on-supersede semantics: scheduling a field again replaces its
//! pending write, and only the newest value reaches the document store after
//! the quiet interval. `flush` forces everything still pending out in a
//! single patch, e.g. on save-and-exit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use greenroom_docstore::{DraftPatch, DraftStore, DraftStoreResult};

/// An auto-saved draft field and its new value.
#[derive(Debug, Clone)]
pub enum DraftField {
    Name(String),
    Bio(String),
    HeroBrightness(u8),
    HeroPositionY(u8),
}

impl DraftField {
    pub fn field_name(&self) -> &'static str {
        match self {
            DraftField::Name(_) => "name",
            DraftField::Bio(_) => "bio",
            DraftField::HeroBrightness(_) => "heroBrightness",
            DraftField::HeroPositionY(_) => "heroPositionY",
        }
    }

    fn into_patch(self) -> DraftPatch {
        match self {
            DraftField::Name(name) => DraftPatch::new().name(name),
            DraftField::Bio(bio) => DraftPatch::new().bio(bio),
            DraftField::HeroBrightness(value) => DraftPatch::new().hero_brightness(value),
            DraftField::HeroPositionY(value) => DraftPatch::new().hero_position_y(value),
        }
    }
}

struct PendingWrite {
    seq: u64,
    value: DraftField,
    handle: JoinHandle<()>,
}

pub struct DebouncedFieldWriter {
    profile_id: Uuid,
    drafts: Arc<dyn DraftStore>,
    delay: Duration,
    seq: AtomicU64,
    pending: Mutex<HashMap<&'static str, PendingWrite>>,
}

impl DebouncedFieldWriter {
    pub fn new(profile_id: Uuid, drafts: Arc<dyn DraftStore>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            profile_id,
            drafts,
            delay,
            seq: AtomicU64::new(0),
            pending: Mutex::new(HashMap::new()),
        })
    }

    /// Schedule a field write after the quiet interval, superseding any write
    /// already pending for the same field.
    pub fn schedule(self: &Arc<Self>, field: DraftField) {
        let name = field.field_name();
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        // Hold the lock across the spawn so the new task cannot observe the
        // map before its own entry is inserted.
        let mut pending = self.pending.lock().expect("debounce lock poisoned");
        if let Some(superseded) = pending.remove(name) {
            superseded.handle.abort();
        }
        let writer = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(writer.delay).await;
            writer.commit(name, seq).await;
        });
        pending.insert(name, PendingWrite { seq, value: field, handle });
    }

    async fn commit(&self, name: &'static str, seq: u64) {
        let field = {
            let mut pending = self.pending.lock().expect("debounce lock poisoned");
            match pending.get(name) {
                Some(write) if write.seq == seq => pending.remove(name).map(|write| write.value),
                _ => None,
            }
        };
        let Some(field) = field else {
            return;
        };
        if let Err(e) = self.drafts.write_draft(self.profile_id, field.into_patch()).await {
            tracing::warn!(
                error = %e,
                field = name,
                profile_id = %self.profile_id,
                "Debounced field write failed"
            );
        }
    }

    /// Write all still-pending fields immediately as one patch.
    pub async fn flush(&self) -> DraftStoreResult<()> {
        let fields: Vec<DraftField> = {
            let mut pending = self.pending.lock().expect("debounce lock poisoned");
            pending
                .drain()
                .map(|(_, write)| {
                    write.handle.abort();
                    write.value
                })
                .collect()
        };
        if fields.is_empty() {
            return Ok(());
        }
        let patch = fields
            .into_iter()
            .fold(DraftPatch::new(), |acc, field| field.into_patch().merge_over(acc));
        self.drafts.write_draft(self.profile_id, patch).await
    }

    /// Drop all pending writes without persisting them.
    pub fn shut_down(&self) {
        let mut pending = self.pending.lock().expect("debounce lock poisoned");
        for (_, write) in pending.drain() {
            write.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenroom_core::Draft;
    use greenroom_docstore::MemoryDraftStore;

    async fn store_with_draft() -> (Arc<MemoryDraftStore>, Uuid) {
        let store = Arc::new(MemoryDraftStore::new());
        let draft = Draft::new(Uuid::new_v4());
        let profile_id = draft.profile_id;
        store.create_draft(draft).await.unwrap();
        (store, profile_id)
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_value_is_written() {
        let (store, profile_id) = store_with_draft().await;
        let writer = DebouncedFieldWriter::new(profile_id, store.clone(), Duration::from_millis(200));

        writer.schedule(DraftField::Name("first".to_string()));
        writer.schedule(DraftField::Name("second".to_string()));
        tokio::time::sleep(Duration::from_millis(300)).await;

        let draft = store.read_draft(profile_id).await.unwrap().unwrap();
        assert_eq!(draft.name, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fields_debounced_independently() {
        let (store, profile_id) = store_with_draft().await;
        let writer = DebouncedFieldWriter::new(profile_id, store.clone(), Duration::from_millis(100));

        writer.schedule(DraftField::Name("a name".to_string()));
        writer.schedule(DraftField::Bio("a bio".to_string()));
        tokio::time::sleep(Duration::from_millis(200)).await;

        let draft = store.read_draft(profile_id).await.unwrap().unwrap();
        assert_eq!(draft.name, "a name");
        assert_eq!(draft.bio, "a bio");
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_pending_immediately() {
        let (store, profile_id) = store_with_draft().await;
        let writer =
            DebouncedFieldWriter::new(profile_id, store.clone(), Duration::from_secs(3600));

        writer.schedule(DraftField::Name("flushed".to_string()));
        writer.schedule(DraftField::HeroBrightness(120));
        writer.flush().await.unwrap();

        let draft = store.read_draft(profile_id).await.unwrap().unwrap();
        assert_eq!(draft.name, "flushed");
        assert_eq!(draft.hero_brightness, 120);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shut_down_drops_pending_writes() {
        let (store, profile_id) = store_with_draft().await;
        let writer = DebouncedFieldWriter::new(profile_id, store.clone(), Duration::from_millis(50));

        writer.schedule(DraftField::Name("never".to_string()));
        writer.shut_down();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let draft = store.read_draft(profile_id).await.unwrap().unwrap();
        assert_eq!(draft.name, "");
    }
}
