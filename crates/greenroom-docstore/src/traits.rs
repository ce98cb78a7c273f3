//! Draft store abstraction trait.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use greenroom_core::Draft;

use crate::patch::DraftPatch;

/// Draft store operation errors
#[derive(Debug, Error)]
pub enum DraftStoreError {
    #[error("Draft not found: {0}")]
    NotFound(Uuid),

    #[error("Draft already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("Document store error: {0}")]
    BackendError(String),
}

/// Result type for draft store operations
pub type DraftStoreResult<T> = Result<T, DraftStoreError>;

/// Draft document store abstraction.
///
/// One draft exists per profile id. The store also maintains the owning user
/// record's list of profile references, which is written before the draft
/// document itself when a profile is created (and rolled back on failure).
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Read the draft for a profile, if one exists.
    async fn read_draft(&self, profile_id: Uuid) -> DraftStoreResult<Option<Draft>>;

    /// Create a new draft document. Fails if one already exists.
    async fn create_draft(&self, draft: Draft) -> DraftStoreResult<()>;

    /// Apply a partial update to an existing draft. Only the fields present
    /// on the patch are written; everything else is left untouched.
    async fn write_draft(&self, profile_id: Uuid, patch: DraftPatch) -> DraftStoreResult<()>;

    /// Delete a draft document. Idempotent.
    async fn delete_draft(&self, profile_id: Uuid) -> DraftStoreResult<()>;

    /// Add a profile reference to the owning user record.
    async fn attach_profile_ref(&self, user_id: Uuid, profile_id: Uuid) -> DraftStoreResult<()>;

    /// Remove a profile reference from the owning user record. Idempotent.
    async fn detach_profile_ref(&self, user_id: Uuid, profile_id: Uuid) -> DraftStoreResult<()>;
}
