//! Per-asset upload pipelines.
//!
//! Each pipeline drives the file upload(s) for one asset with a pending local
//! file, reporting per-file progress into the batch aggregator and committing
//! results back into shared wizard state. Pipelines receive their inputs as
//! captured-by-value snapshots and every commit re-checks the batch token, so
//! a superseded or torn-down batch settles as a silent no-op. Failures are
//! converted to per-slot status flags at this boundary; nothing escapes a
//! pipeline task as an error.

use chrono::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use greenroom_core::PendingFile;
use greenroom_storage::{media_storage_key, MediaKind, ProgressCallback, Storage};

use crate::paths::{self, StoragePathTracker};
use crate::progress::BatchProgress;
use crate::session::WizardState;
use crate::token::{BatchToken, UploadTokenRegistry};

/// Everything a pipeline task needs, cloned out of the owning session.
pub(crate) struct PipelineContext {
    pub profile_id: Uuid,
    pub namespace: String,
    pub storage: Arc<dyn Storage>,
    pub tokens: Arc<UploadTokenRegistry>,
    pub paths: Arc<StoragePathTracker>,
    pub state: Arc<Mutex<WizardState>>,
    pub progress: Arc<BatchProgress>,
}

/// Snapshot of one asset's pending uploads, captured when the batch starts.
pub(crate) struct AssetUpload {
    pub asset_id: Uuid,
    pub slots: Vec<(MediaKind, PendingFile)>,
}

/// Run all slot uploads for one asset. Slots upload sequentially within the
/// asset; assets run concurrently within the batch.
pub(crate) async fn run_asset_pipeline(
    ctx: Arc<PipelineContext>,
    token: BatchToken,
    upload: AssetUpload,
) {
    for (kind, file) in upload.slots {
        upload_slot(&ctx, token, upload.asset_id, kind, file).await;
    }
}

async fn upload_slot(
    ctx: &PipelineContext,
    token: BatchToken,
    asset_id: Uuid,
    kind: MediaKind,
    file: PendingFile,
) {
    let storage_key = media_storage_key(
        &ctx.namespace,
        ctx.profile_id,
        kind,
        asset_id,
        Utc::now(),
        &file.file_name,
    );

    let on_progress: ProgressCallback = {
        let tokens = ctx.tokens.clone();
        let progress = ctx.progress.clone();
        Arc::new(move |percent| {
            if tokens.is_current(token) {
                progress.file_progress(percent);
            }
        })
    };

    let result = ctx
        .storage
        .upload(
            &storage_key,
            &file.content_type,
            file.bytes.clone(),
            Some(on_progress),
        )
        .await;

    match result {
        Ok(url) => match commit_slot_success(ctx, token, asset_id, kind, &url, &storage_key) {
            CommitOutcome::Applied { previous } => {
                paths::maybe_delete_orphan(ctx.storage.as_ref(), previous.as_deref(), &storage_key)
                    .await;
                ctx.progress.file_completed();
            }
            CommitOutcome::Stale => {
                // A newer batch owns this family now; this blob can never be
                // referenced by the draft.
                paths::delete_orphan(ctx.storage.as_ref(), &storage_key).await;
                ctx.progress.file_completed();
            }
        },
        Err(e) => {
            tracing::warn!(
                error = %e,
                asset_id = %asset_id,
                media_kind = %kind,
                storage_key = %storage_key,
                "Slot upload failed"
            );
            commit_slot_error(ctx, token, asset_id, kind);
            ctx.progress.file_failed();
        }
    }
}

enum CommitOutcome {
    Applied { previous: Option<String> },
    Stale,
}

/// Write a settled upload into the asset's slot. The token check happens
/// under the state lock, together with the path-tracker update.
fn commit_slot_success(
    ctx: &PipelineContext,
    token: BatchToken,
    asset_id: Uuid,
    kind: MediaKind,
    url: &str,
    storage_key: &str,
) -> CommitOutcome {
    let mut state = ctx.state.lock().expect("wizard state lock poisoned");
    if !ctx.tokens.is_current(token) {
        return CommitOutcome::Stale;
    }
    let Some(slot) = state.slot_mut(asset_id, kind) else {
        // Asset was removed while its upload was in flight.
        return CommitOutcome::Stale;
    };
    let previous = ctx.paths.record_new_path(asset_id, kind, storage_key);
    slot.confirm_upload(url.to_string(), storage_key.to_string(), Utc::now());
    CommitOutcome::Applied { previous }
}

fn commit_slot_error(ctx: &PipelineContext, token: BatchToken, asset_id: Uuid, kind: MediaKind) {
    let mut state = ctx.state.lock().expect("wizard state lock poisoned");
    if !ctx.tokens.is_current(token) {
        return;
    }
    if let Some(slot) = state.slot_mut(asset_id, kind) {
        slot.mark_error();
    }
}
