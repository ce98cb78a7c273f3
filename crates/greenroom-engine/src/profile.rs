//! Profile draft creation.
//!
//! Creating a profile writes a reference onto the owning user record first,
//! then creates the draft document. If the document creation fails, the
//! reference write is rolled back best-effort: a rollback failure is logged
//! and not re-thrown, leaving a dangling reference rather than surfacing a
//! second error to the user.

use std::sync::Arc;
use uuid::Uuid;

use greenroom_core::Draft;
use greenroom_docstore::DraftStore;

use crate::error::EngineResult;

pub struct ProfileService {
    drafts: Arc<dyn DraftStore>,
}

impl ProfileService {
    pub fn new(drafts: Arc<dyn DraftStore>) -> Self {
        Self { drafts }
    }

    /// Create a fresh draft for a user and return it.
    pub async fn create_profile_draft(&self, user_id: Uuid) -> EngineResult<Draft> {
        let draft = Draft::new(Uuid::new_v4());
        let profile_id = draft.profile_id;

        self.drafts.attach_profile_ref(user_id, profile_id).await?;

        match self.drafts.create_draft(draft.clone()).await {
            Ok(()) => {
                tracing::info!(
                    profile_id = %profile_id,
                    user_id = %user_id,
                    "Created profile draft"
                );
                Ok(draft)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    profile_id = %profile_id,
                    user_id = %user_id,
                    "Draft creation failed, rolling back profile reference"
                );
                if let Err(rollback) = self.drafts.detach_profile_ref(user_id, profile_id).await {
                    tracing::error!(
                        error = %rollback,
                        profile_id = %profile_id,
                        user_id = %user_id,
                        "Profile reference rollback failed"
                    );
                }
                Err(e.into())
            }
        }
    }
}
