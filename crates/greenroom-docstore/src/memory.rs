//! In-memory draft store.
//!
//! Backs the engine's tests and local development. Partial-write semantics
//! match what the production document store is expected to provide: a patch
//! only touches the fields it carries.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use greenroom_core::Draft;

use crate::patch::DraftPatch;
use crate::traits::{DraftStore, DraftStoreError, DraftStoreResult};

#[derive(Default)]
pub struct MemoryDraftStore {
    drafts: Mutex<HashMap<Uuid, Draft>>,
    profile_refs: Mutex<HashMap<Uuid, Vec<Uuid>>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile references currently attached to a user record.
    pub fn profile_refs_for(&self, user_id: Uuid) -> Vec<Uuid> {
        self.profile_refs
            .lock()
            .expect("profile refs lock poisoned")
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn read_draft(&self, profile_id: Uuid) -> DraftStoreResult<Option<Draft>> {
        let drafts = self.drafts.lock().expect("drafts lock poisoned");
        Ok(drafts.get(&profile_id).cloned())
    }

    async fn create_draft(&self, draft: Draft) -> DraftStoreResult<()> {
        let mut drafts = self.drafts.lock().expect("drafts lock poisoned");
        if drafts.contains_key(&draft.profile_id) {
            return Err(DraftStoreError::AlreadyExists(draft.profile_id));
        }
        drafts.insert(draft.profile_id, draft);
        Ok(())
    }

    async fn write_draft(&self, profile_id: Uuid, patch: DraftPatch) -> DraftStoreResult<()> {
        let mut drafts = self.drafts.lock().expect("drafts lock poisoned");
        let draft = drafts
            .get_mut(&profile_id)
            .ok_or(DraftStoreError::NotFound(profile_id))?;

        if let Some(name) = patch.name {
            draft.name = name;
        }
        if let Some(bio) = patch.bio {
            draft.bio = bio;
        }
        if let Some(hero_media) = patch.hero_media {
            draft.hero_media = hero_media;
        }
        if let Some(brightness) = patch.hero_brightness {
            draft.hero_brightness = brightness;
        }
        if let Some(position_y) = patch.hero_position_y {
            draft.hero_position_y = position_y;
        }
        if let Some(tracks) = patch.tracks {
            draft.tracks = tracks;
        }
        if let Some(videos) = patch.videos {
            draft.videos = videos;
        }
        if let Some(last_stage) = patch.last_stage {
            draft.last_stage = last_stage;
        }
        if let Some(status) = patch.status {
            draft.status = status;
        }
        if let Some(is_complete) = patch.is_complete {
            draft.is_complete = is_complete;
        }
        if let Some(media_usage_bytes) = patch.media_usage_bytes {
            draft.media_usage_bytes = media_usage_bytes;
        }
        Ok(())
    }

    async fn delete_draft(&self, profile_id: Uuid) -> DraftStoreResult<()> {
        let mut drafts = self.drafts.lock().expect("drafts lock poisoned");
        drafts.remove(&profile_id);
        Ok(())
    }

    async fn attach_profile_ref(&self, user_id: Uuid, profile_id: Uuid) -> DraftStoreResult<()> {
        let mut refs = self.profile_refs.lock().expect("profile refs lock poisoned");
        let entries = refs.entry(user_id).or_default();
        if !entries.contains(&profile_id) {
            entries.push(profile_id);
        }
        Ok(())
    }

    async fn detach_profile_ref(&self, user_id: Uuid, profile_id: Uuid) -> DraftStoreResult<()> {
        let mut refs = self.profile_refs.lock().expect("profile refs lock poisoned");
        if let Some(entries) = refs.get_mut(&user_id) {
            entries.retain(|id| *id != profile_id);
        }
        Ok(())
    }
}
