//! The wizard session.
//!
//! One `WizardSession` owns a profile's creation flow: the in-memory asset
//! lists, the step machine, the upload token registry, the storage path
//! tracker, and the batch aggregators. Asset lists are owned exclusively by
//! this session; a draft is never edited from two sessions at once.
//!
//! Leaving the hero, tracks, or videos step starts that family's upload batch
//! in the background, so the user keeps editing metadata while files
//! transfer. Batches settle by reconciling the in-memory lists against the
//! persisted draft and writing the result in one partial update.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

use greenroom_core::models::{HeroAsset, MediaSlot, SlotStatus, ThumbnailState, TrackAsset, VideoAsset};
use greenroom_core::{Draft, PendingFile, WizardConfig, WizardStep};
use greenroom_docstore::{DraftPatch, DraftStore};
use greenroom_storage::{MediaKind, Storage, StorageError};

use crate::debounce::{DebouncedFieldWriter, DraftField};
use crate::error::{EngineError, EngineResult};
use crate::paths::{self, StoragePathTracker};
use crate::pipeline::{run_asset_pipeline, AssetUpload, PipelineContext};
use crate::progress::{BatchProgress, BatchProgressSnapshot, BatchStatus};
use crate::quota::{QuotaAccountant, QuotaReport, SizeProbe};
use crate::reconcile::{media_usage_bytes, reconcile_tracks, reconcile_videos};
use crate::thumbnail::ThumbnailGenerator;
use crate::token::{MediaFamily, UploadTokenRegistry};
use crate::wizard::{
    upload_trigger, HeroEditState, HeroMode, RetreatOutcome, StepChange, StepError, StepMachine,
    StepValidator,
};

/// Reorder direction for track and video lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Inputs for saving the hero edit region.
#[derive(Debug, Default)]
pub struct HeroEditUpdate {
    pub file: Option<PendingFile>,
    pub brightness: Option<u8>,
    pub position_y: Option<u8>,
}

/// The session's mutable wizard state. Readiness validators receive a shared
/// reference to this.
pub struct WizardState {
    pub hero: HeroAsset,
    pub hero_mode: HeroMode,
    pub tracks: Vec<TrackAsset>,
    pub videos: Vec<VideoAsset>,
    pub name: String,
    pub bio: String,
    hero_id: Uuid,
}

impl WizardState {
    pub(crate) fn slot_mut(&mut self, asset_id: Uuid, kind: MediaKind) -> Option<&mut MediaSlot> {
        match kind {
            MediaKind::Hero => {
                if asset_id == self.hero_id {
                    Some(&mut self.hero.slot)
                } else {
                    None
                }
            }
            MediaKind::Audio => self
                .tracks
                .iter_mut()
                .find(|t| t.id == asset_id)
                .map(|t| &mut t.audio),
            MediaKind::Cover => self
                .tracks
                .iter_mut()
                .find(|t| t.id == asset_id)
                .map(|t| &mut t.cover),
            MediaKind::Video => self
                .videos
                .iter_mut()
                .find(|v| v.id == asset_id)
                .map(|v| &mut v.video),
            MediaKind::Thumbnail => self
                .videos
                .iter_mut()
                .find(|v| v.id == asset_id)
                .map(|v| &mut v.thumbnail),
        }
    }
}

pub struct WizardSession {
    profile_id: Uuid,
    hero_id: Uuid,
    config: WizardConfig,
    storage: Arc<dyn Storage>,
    drafts: Arc<dyn DraftStore>,
    thumbnailer: Arc<dyn ThumbnailGenerator>,
    tokens: Arc<UploadTokenRegistry>,
    paths: Arc<StoragePathTracker>,
    quota: QuotaAccountant,
    state: Arc<Mutex<WizardState>>,
    machine: Mutex<StepMachine<WizardState>>,
    hero_edit: Mutex<HeroEditState>,
    progress_rx: Mutex<HashMap<MediaFamily, watch::Receiver<BatchProgressSnapshot>>>,
    autosave: Arc<DebouncedFieldWriter>,
}

impl WizardSession {
    /// Resume the session for an existing draft.
    pub async fn resume(
        profile_id: Uuid,
        config: WizardConfig,
        storage: Arc<dyn Storage>,
        drafts: Arc<dyn DraftStore>,
        thumbnailer: Arc<dyn ThumbnailGenerator>,
        probe: Arc<dyn SizeProbe>,
    ) -> EngineResult<Self> {
        let draft = drafts
            .read_draft(profile_id)
            .await?
            .ok_or(EngineError::DraftNotFound(profile_id))?;
        Ok(Self::from_draft(draft, config, storage, drafts, thumbnailer, probe).await)
    }

    /// Build a session from an already-loaded draft (fresh or resumed).
    pub async fn from_draft(
        draft: Draft,
        config: WizardConfig,
        storage: Arc<dyn Storage>,
        drafts: Arc<dyn DraftStore>,
        thumbnailer: Arc<dyn ThumbnailGenerator>,
        probe: Arc<dyn SizeProbe>,
    ) -> Self {
        let hero_id = Uuid::new_v4();

        let hero = match &draft.hero_media {
            Some(record) => HeroAsset::hydrate(record, draft.hero_brightness, draft.hero_position_y),
            None => HeroAsset {
                brightness: draft.hero_brightness,
                position_y: draft.hero_position_y,
                ..HeroAsset::default()
            },
        };

        let mut state = WizardState {
            hero_mode: if hero.has_image() {
                HeroMode::Adjust
            } else {
                HeroMode::Upload
            },
            hero,
            tracks: draft.tracks.iter().map(TrackAsset::from_record).collect(),
            videos: draft.videos.iter().map(VideoAsset::from_record).collect(),
            name: draft.name.clone(),
            bio: draft.bio.clone(),
            hero_id,
        };

        resolve_missing_urls(storage.as_ref(), &mut state).await;

        let paths = Arc::new(StoragePathTracker::new());
        seed_path_tracker(&paths, &state, hero_id);

        let mut machine = StepMachine::new(default_validators());
        machine.resume(draft.last_stage);

        let autosave = DebouncedFieldWriter::new(
            draft.profile_id,
            drafts.clone(),
            Duration::from_millis(config.autosave_debounce_ms),
        );

        Self {
            profile_id: draft.profile_id,
            hero_id,
            quota: QuotaAccountant::new(config.media_storage_limit_bytes, probe),
            config,
            storage,
            drafts,
            thumbnailer,
            tokens: Arc::new(UploadTokenRegistry::new()),
            paths,
            state: Arc::new(Mutex::new(state)),
            machine: Mutex::new(machine),
            hero_edit: Mutex::new(HeroEditState::Viewing),
            progress_rx: Mutex::new(HashMap::new()),
            autosave,
        }
    }

    pub fn profile_id(&self) -> Uuid {
        self.profile_id
    }

    pub fn current_step(&self) -> WizardStep {
        self.machine.lock().expect("step machine lock poisoned").current()
    }

    pub fn hero_mode(&self) -> HeroMode {
        self.lock_state().hero_mode
    }

    pub fn hero(&self) -> HeroAsset {
        self.lock_state().hero.clone()
    }

    pub fn tracks(&self) -> Vec<TrackAsset> {
        self.lock_state().tracks.clone()
    }

    pub fn videos(&self) -> Vec<VideoAsset> {
        self.lock_state().videos.clone()
    }

    /// Latest batch progress for a family, if a batch was ever started.
    pub fn progress(&self, family: MediaFamily) -> Option<watch::Receiver<BatchProgressSnapshot>> {
        self.progress_rx
            .lock()
            .expect("progress map lock poisoned")
            .get(&family)
            .cloned()
    }

    // ---- field edits -------------------------------------------------------

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.lock_state().name = name.clone();
        self.autosave.schedule(DraftField::Name(name));
    }

    pub fn set_bio(&self, bio: impl Into<String>) {
        let bio = bio.into();
        self.lock_state().bio = bio.clone();
        self.autosave.schedule(DraftField::Bio(bio));
    }

    pub fn set_hero_brightness(&self, brightness: u8) {
        self.lock_state().hero.brightness = brightness;
        self.autosave.schedule(DraftField::HeroBrightness(brightness));
    }

    pub fn set_hero_position_y(&self, position_y: u8) {
        self.lock_state().hero.position_y = position_y;
        self.autosave.schedule(DraftField::HeroPositionY(position_y));
    }

    // ---- hero --------------------------------------------------------------

    /// Pick (or replace) the hero image and enter the adjust sub-mode.
    pub fn pick_hero(&self, file: PendingFile) {
        let mut state = self.lock_state();
        state.hero.pick(file);
        state.hero_mode = HeroMode::Adjust;
    }

    // ---- tracks ------------------------------------------------------------

    /// Add a track from a picked audio file. Title and artist are seeded the
    /// way the tracks step presents them.
    pub fn add_track(&self, file: PendingFile) -> Uuid {
        let mut state = self.lock_state();
        let title = format!("Track {}", state.tracks.len() + 1);
        let artist = state.name.clone();
        let track = TrackAsset::new(title, artist, file);
        let id = track.id;
        state.tracks.push(track);
        id
    }

    pub fn set_track_cover(&self, track_id: Uuid, file: PendingFile) -> EngineResult<()> {
        let mut state = self.lock_state();
        let track = state
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or(EngineError::AssetNotFound(track_id))?;
        track.cover.set_pending(file);
        Ok(())
    }

    pub fn set_track_title(&self, track_id: Uuid, title: impl Into<String>) -> EngineResult<()> {
        let mut state = self.lock_state();
        let track = state
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or(EngineError::AssetNotFound(track_id))?;
        track.title = title.into();
        Ok(())
    }

    pub fn set_track_artist(&self, track_id: Uuid, artist: impl Into<String>) -> EngineResult<()> {
        let mut state = self.lock_state();
        let track = state
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or(EngineError::AssetNotFound(track_id))?;
        track.artist = artist.into();
        Ok(())
    }

    pub fn move_track(&self, track_id: Uuid, direction: MoveDirection) -> EngineResult<()> {
        let mut state = self.lock_state();
        move_in_list(&mut state.tracks, |t| t.id == track_id, direction)
            .then_some(())
            .ok_or(EngineError::AssetNotFound(track_id))
    }

    /// Remove a track and delete the storage behind its uploaded slots.
    pub async fn remove_track(&self, track_id: Uuid) -> EngineResult<()> {
        let orphaned = {
            let mut state = self.lock_state();
            let position = state
                .tracks
                .iter()
                .position(|t| t.id == track_id)
                .ok_or(EngineError::AssetNotFound(track_id))?;
            let track = state.tracks.remove(position);
            let mut orphaned = self.paths.forget_asset(track_id);
            for path in [track.audio.storage_path, track.cover.storage_path]
                .into_iter()
                .flatten()
            {
                if !orphaned.contains(&path) {
                    orphaned.push(path);
                }
            }
            orphaned
        };
        for path in &orphaned {
            paths::delete_orphan(self.storage.as_ref(), path).await;
        }
        Ok(())
    }

    // ---- videos ------------------------------------------------------------

    /// Add a video from a picked file. Thumbnail generation starts in the
    /// background and never blocks the video upload.
    pub fn add_video(&self, file: PendingFile) -> Uuid {
        let id = {
            let mut state = self.lock_state();
            let title = format!("Video {}", state.videos.len() + 1);
            let mut video = VideoAsset::new(title, file.clone());
            video.thumbnail_state = ThumbnailState::Generating;
            let id = video.id;
            state.videos.push(video);
            id
        };

        let thumbnailer = self.thumbnailer.clone();
        let tokens = self.tokens.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let result = thumbnailer.generate(&file.bytes).await;
            if !tokens.is_live() {
                return;
            }
            let mut state = state.lock().expect("wizard state lock poisoned");
            let Some(video) = state.videos.iter_mut().find(|v| v.id == id) else {
                return;
            };
            match result {
                Ok(thumbnail) => {
                    let file_name = format!("{}-thumbnail.png", file_stem(&file.file_name));
                    video
                        .thumbnail
                        .set_pending(PendingFile::new(file_name, thumbnail.content_type, thumbnail.bytes));
                    video.thumbnail_state = ThumbnailState::Ready;
                }
                Err(e) => {
                    tracing::warn!(error = %e, video_id = %id, "Thumbnail generation failed");
                    video.thumbnail_state = ThumbnailState::Failed(e.to_string());
                }
            }
        });

        id
    }

    pub fn set_video_title(&self, video_id: Uuid, title: impl Into<String>) -> EngineResult<()> {
        let mut state = self.lock_state();
        let video = state
            .videos
            .iter_mut()
            .find(|v| v.id == video_id)
            .ok_or(EngineError::AssetNotFound(video_id))?;
        video.title = title.into();
        Ok(())
    }

    pub fn move_video(&self, video_id: Uuid, direction: MoveDirection) -> EngineResult<()> {
        let mut state = self.lock_state();
        move_in_list(&mut state.videos, |v| v.id == video_id, direction)
            .then_some(())
            .ok_or(EngineError::AssetNotFound(video_id))
    }

    /// Remove a video and delete the storage behind its uploaded slots.
    pub async fn remove_video(&self, video_id: Uuid) -> EngineResult<()> {
        let orphaned = {
            let mut state = self.lock_state();
            let position = state
                .videos
                .iter()
                .position(|v| v.id == video_id)
                .ok_or(EngineError::AssetNotFound(video_id))?;
            let video = state.videos.remove(position);
            let mut orphaned = self.paths.forget_asset(video_id);
            for path in [video.video.storage_path, video.thumbnail.storage_path]
                .into_iter()
                .flatten()
            {
                if !orphaned.contains(&path) {
                    orphaned.push(path);
                }
            }
            orphaned
        };
        for path in &orphaned {
            paths::delete_orphan(self.storage.as_ref(), path).await;
        }
        Ok(())
    }

    // ---- step navigation ---------------------------------------------------

    /// Advance to the next step if the current one is ready. Exiting a media
    /// step starts that family's upload batch.
    pub async fn advance(&self) -> EngineResult<WizardStep> {
        let change = {
            let state = self.lock_state();
            let mut machine = self.machine.lock().expect("step machine lock poisoned");
            machine.advance(&*state).map_err(EngineError::from)?
        };
        self.after_step_change(change).await;
        Ok(change.to)
    }

    /// Move back one step. On the hero step's adjust sub-mode this resets to
    /// the upload sub-mode instead. Exiting a media step still triggers its
    /// upload batch.
    pub async fn retreat(&self) -> WizardStep {
        let outcome = {
            let mut state = self.lock_state();
            let mut machine = self.machine.lock().expect("step machine lock poisoned");
            machine.retreat(&mut state.hero_mode)
        };
        if let RetreatOutcome::Moved(change) = outcome {
            self.after_step_change(change).await;
            return change.to;
        }
        self.current_step()
    }

    async fn after_step_change(&self, change: StepChange) {
        if let Some(family) = upload_trigger(change.from) {
            self.start_family_batch(family);
        }
        if let Err(e) = self
            .drafts
            .write_draft(self.profile_id, DraftPatch::new().last_stage(change.to))
            .await
        {
            tracing::warn!(
                error = %e,
                profile_id = %self.profile_id,
                stage = %change.to,
                "Failed to persist wizard stage"
            );
        }
    }

    // ---- uploads -----------------------------------------------------------

    /// Start an upload batch for a family. With nothing to upload the batch
    /// reports complete immediately and no token is spent, so an in-flight
    /// batch is never superseded by an empty one.
    fn start_family_batch(&self, family: MediaFamily) {
        let uploads = {
            let mut state = self.lock_state();
            collect_pending_uploads(&mut state, family, self.hero_id)
        };
        let total_files: usize = uploads.iter().map(|u| u.slots.len()).sum();

        if total_files == 0 {
            let mut progress_map = self.progress_rx.lock().expect("progress map lock poisoned");
            let uploading = progress_map
                .get(&family)
                .map(|rx| rx.borrow().status == BatchStatus::Uploading)
                .unwrap_or(false);
            if !uploading {
                let (_, rx) = BatchProgress::start(0);
                progress_map.insert(family, rx);
            }
            return;
        }

        let token = self.tokens.begin_batch(family);
        let (progress, rx) = BatchProgress::start(total_files);
        self.progress_rx
            .lock()
            .expect("progress map lock poisoned")
            .insert(family, rx);

        tracing::info!(
            family = %family,
            files = total_files,
            profile_id = %self.profile_id,
            "Starting upload batch"
        );

        let ctx = self.pipeline_context(progress);
        let drafts = self.drafts.clone();
        let tokens = self.tokens.clone();
        let state = self.state.clone();
        let profile_id = self.profile_id;

        tokio::spawn(async move {
            let tasks: Vec<_> = uploads
                .into_iter()
                .map(|upload| {
                    let ctx = ctx.clone();
                    tokio::spawn(run_asset_pipeline(ctx, token, upload))
                })
                .collect();
            futures::future::join_all(tasks).await;

            if tokens.is_current(token) {
                if let Err(e) =
                    persist_media(drafts.as_ref(), &state, profile_id, DraftPatch::new()).await
                {
                    tracing::error!(
                        error = %e,
                        family = %family,
                        profile_id = %profile_id,
                        "Failed to persist draft after upload batch"
                    );
                }
            }
        });
    }

    fn pipeline_context(&self, progress: Arc<BatchProgress>) -> Arc<PipelineContext> {
        Arc::new(PipelineContext {
            profile_id: self.profile_id,
            namespace: self.config.storage_namespace.clone(),
            storage: self.storage.clone(),
            tokens: self.tokens.clone(),
            paths: self.paths.clone(),
            state: self.state.clone(),
            progress,
        })
    }

    // ---- persistence -------------------------------------------------------

    /// Flush pending field edits and persist the reconciled draft, leaving
    /// the wizard resumable at the current step.
    pub async fn save_and_exit(&self) -> EngineResult<()> {
        self.autosave.flush().await?;
        let last_stage = self.current_step();
        persist_media(
            self.drafts.as_ref(),
            &self.state,
            self.profile_id,
            DraftPatch::new().last_stage(last_stage),
        )
        .await
    }

    /// Finish the wizard: persist everything and mark the draft complete.
    pub async fn complete(&self) -> EngineResult<()> {
        self.autosave.flush().await?;
        persist_media(
            self.drafts.as_ref(),
            &self.state,
            self.profile_id,
            DraftPatch::new()
                .last_stage(WizardStep::TechRider)
                .status(greenroom_core::models::DraftStatus::Complete)
                .is_complete(true),
        )
        .await
    }

    /// Current storage usage against the soft cap. Display-only; uploads are
    /// never blocked on this.
    pub async fn usage_report(&self) -> QuotaReport {
        let (tracks, videos) = {
            let state = self.lock_state();
            (state.tracks.clone(), state.videos.clone())
        };
        self.quota.usage_report(&tracks, &videos).await
    }

    /// Tear the session down. Every outstanding upload continuation and
    /// pending debounced write becomes a no-op.
    pub fn shut_down(&self) {
        self.tokens.shut_down();
        self.autosave.shut_down();
    }

    // ---- hero edit region --------------------------------------------------

    pub fn hero_edit_state(&self) -> HeroEditState {
        *self.hero_edit.lock().expect("hero edit lock poisoned")
    }

    pub fn begin_hero_edit(&self) -> EngineResult<()> {
        let mut edit = self.hero_edit.lock().expect("hero edit lock poisoned");
        *edit = edit.begin_edit().map_err(EngineError::from)?;
        Ok(())
    }

    pub fn toggle_hero_reposition(&self) -> EngineResult<()> {
        let mut edit = self.hero_edit.lock().expect("hero edit lock poisoned");
        *edit = edit.toggle_reposition().map_err(EngineError::from)?;
        Ok(())
    }

    /// Save the hero edit region: upload a replacement image if one was
    /// picked, persist presentation settings, and return to viewing.
    pub async fn save_hero_edit(&self, update: HeroEditUpdate) -> EngineResult<()> {
        if self.hero_edit_state() == HeroEditState::Viewing {
            return Err(EngineError::InvalidHeroEdit(
                "save requested outside the edit region".to_string(),
            ));
        }

        {
            let mut state = self.lock_state();
            if let Some(file) = update.file {
                state.hero.pick(file);
            }
            if let Some(brightness) = update.brightness {
                state.hero.brightness = brightness;
            }
            if let Some(position_y) = update.position_y {
                state.hero.position_y = position_y;
            }
        }

        self.upload_hero_now().await?;
        persist_media(self.drafts.as_ref(), &self.state, self.profile_id, DraftPatch::new())
            .await?;

        let mut edit = self.hero_edit.lock().expect("hero edit lock poisoned");
        *edit = edit.finish();
        Ok(())
    }

    /// Leave the hero edit region without saving.
    pub fn cancel_hero_edit(&self) {
        let mut edit = self.hero_edit.lock().expect("hero edit lock poisoned");
        *edit = edit.finish();
    }

    /// Upload the hero slot inline (awaited), as the edit region does.
    async fn upload_hero_now(&self) -> EngineResult<()> {
        let uploads = {
            let mut state = self.lock_state();
            collect_pending_uploads(&mut state, MediaFamily::Hero, self.hero_id)
        };
        let Some(upload) = uploads.into_iter().next() else {
            return Ok(());
        };

        let token = self.tokens.begin_batch(MediaFamily::Hero);
        let (progress, rx) = BatchProgress::start(upload.slots.len());
        self.progress_rx
            .lock()
            .expect("progress map lock poisoned")
            .insert(MediaFamily::Hero, rx);

        let ctx = self.pipeline_context(progress);
        run_asset_pipeline(ctx, token, upload).await;

        let failed = self.lock_state().hero.slot.status == SlotStatus::Error;
        if failed {
            return Err(EngineError::Storage(StorageError::UploadFailed(
                "hero image upload failed".to_string(),
            )));
        }
        Ok(())
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, WizardState> {
        self.state.lock().expect("wizard state lock poisoned")
    }
}

impl From<StepError> for EngineError {
    fn from(err: StepError) -> Self {
        match err {
            StepError::NotReady(step) => EngineError::StepNotReady(step),
            StepError::AtFinalStep => EngineError::AtFinalStep,
            StepError::InvalidHeroEdit { from, action } => {
                EngineError::InvalidHeroEdit(format!("{} from {:?}", action, from))
            }
        }
    }
}

/// Default per-step readiness gates.
fn default_validators() -> HashMap<WizardStep, StepValidator<WizardState>> {
    let mut validators: HashMap<WizardStep, StepValidator<WizardState>> = HashMap::new();
    validators.insert(
        WizardStep::HeroImage,
        Box::new(|state: &WizardState| {
            state.hero.has_image() && state.hero_mode == HeroMode::Adjust
        }),
    );
    validators.insert(
        WizardStep::StageName,
        Box::new(|state: &WizardState| state.name.trim().chars().count() >= 2),
    );
    validators.insert(
        WizardStep::Videos,
        Box::new(|state: &WizardState| !state.videos.is_empty()),
    );
    validators.insert(
        WizardStep::Tracks,
        Box::new(|state: &WizardState| !state.tracks.is_empty()),
    );
    validators
}

/// Snapshot every pending slot of a family, marking it in flight.
fn collect_pending_uploads(
    state: &mut WizardState,
    family: MediaFamily,
    hero_id: Uuid,
) -> Vec<AssetUpload> {
    let mut uploads = Vec::new();
    match family {
        MediaFamily::Hero => {
            if state.hero.slot.needs_upload() {
                if let Some(file) = state.hero.slot.pending.clone() {
                    state.hero.slot.mark_uploading();
                    uploads.push(AssetUpload {
                        asset_id: hero_id,
                        slots: vec![(MediaKind::Hero, file)],
                    });
                }
            }
        }
        MediaFamily::Tracks => {
            for track in &mut state.tracks {
                let mut slots = Vec::new();
                if track.audio.needs_upload() {
                    if let Some(file) = track.audio.pending.clone() {
                        track.audio.mark_uploading();
                        slots.push((MediaKind::Audio, file));
                    }
                }
                if track.cover.needs_upload() {
                    if let Some(file) = track.cover.pending.clone() {
                        track.cover.mark_uploading();
                        slots.push((MediaKind::Cover, file));
                    }
                }
                if !slots.is_empty() {
                    uploads.push(AssetUpload {
                        asset_id: track.id,
                        slots,
                    });
                }
            }
        }
        MediaFamily::Videos => {
            for video in &mut state.videos {
                let mut slots = Vec::new();
                if video.video.needs_upload() {
                    if let Some(file) = video.video.pending.clone() {
                        video.video.mark_uploading();
                        slots.push((MediaKind::Video, file));
                    }
                }
                // A thumbnail still generating is picked up by a later batch;
                // it never delays the video file.
                if video.thumbnail.needs_upload() {
                    if let Some(file) = video.thumbnail.pending.clone() {
                        video.thumbnail.mark_uploading();
                        slots.push((MediaKind::Thumbnail, file));
                    }
                }
                if !slots.is_empty() {
                    uploads.push(AssetUpload {
                        asset_id: video.id,
                        slots,
                    });
                }
            }
        }
    }
    uploads
}

/// Reconcile the in-memory lists against the persisted draft and write the
/// result (plus recomputed usage) in one partial update.
pub(crate) async fn persist_media(
    drafts: &dyn DraftStore,
    state: &Mutex<WizardState>,
    profile_id: Uuid,
    extra: DraftPatch,
) -> EngineResult<()> {
    let remote = drafts
        .read_draft(profile_id)
        .await?
        .ok_or(EngineError::DraftNotFound(profile_id))?;

    let (tracks, videos, hero_media, hero_brightness, hero_position_y) = {
        let state = state.lock().expect("wizard state lock poisoned");
        let tracks = reconcile_tracks(&state.tracks, &remote.tracks);
        let videos = reconcile_videos(&state.videos, &remote.videos);
        // The hero slot only confirms under a current token, so local state is
        // authoritative once it holds a URL; otherwise keep the remote record.
        let hero_media = state.hero.to_record().or_else(|| remote.hero_media.clone());
        (
            tracks,
            videos,
            hero_media,
            state.hero.brightness,
            state.hero.position_y,
        )
    };

    let usage = media_usage_bytes(&tracks, &videos);
    let patch = DraftPatch::new()
        .tracks(tracks)
        .videos(videos)
        .hero_media(hero_media)
        .hero_brightness(hero_brightness)
        .hero_position_y(hero_position_y)
        .media_usage_bytes(usage);

    drafts.write_draft(profile_id, extra.merge_over(patch)).await?;
    Ok(())
}

async fn resolve_missing_urls(storage: &dyn Storage, state: &mut WizardState) {
    resolve_slot_url(storage, &mut state.hero.slot).await;
    for track in &mut state.tracks {
        resolve_slot_url(storage, &mut track.audio).await;
        resolve_slot_url(storage, &mut track.cover).await;
    }
    for video in &mut state.videos {
        resolve_slot_url(storage, &mut video.video).await;
        resolve_slot_url(storage, &mut video.thumbnail).await;
    }
}

async fn resolve_slot_url(storage: &dyn Storage, slot: &mut MediaSlot) {
    if slot.url.is_some() {
        return;
    }
    let Some(path) = slot.storage_path.clone() else {
        return;
    };
    match storage.resolve_download_url(&path).await {
        Ok(url) => {
            slot.url = Some(url);
            slot.status = SlotStatus::Uploaded;
        }
        Err(e) => {
            tracing::warn!(error = %e, storage_path = %path, "Failed to resolve download URL");
        }
    }
}

fn seed_path_tracker(paths: &StoragePathTracker, state: &WizardState, hero_id: Uuid) {
    if let Some(path) = &state.hero.slot.storage_path {
        paths.record_new_path(hero_id, MediaKind::Hero, path);
    }
    for track in &state.tracks {
        if let Some(path) = &track.audio.storage_path {
            paths.record_new_path(track.id, MediaKind::Audio, path);
        }
        if let Some(path) = &track.cover.storage_path {
            paths.record_new_path(track.id, MediaKind::Cover, path);
        }
    }
    for video in &state.videos {
        if let Some(path) = &video.video.storage_path {
            paths.record_new_path(video.id, MediaKind::Video, path);
        }
        if let Some(path) = &video.thumbnail.storage_path {
            paths.record_new_path(video.id, MediaKind::Thumbnail, path);
        }
    }
}

fn file_stem(file_name: &str) -> &str {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    if stem.is_empty() {
        "video"
    } else {
        stem
    }
}

fn move_in_list<T>(
    list: &mut [T],
    mut matches: impl FnMut(&T) -> bool,
    direction: MoveDirection,
) -> bool {
    let Some(index) = list.iter().position(|item| matches(item)) else {
        return false;
    };
    let target = match direction {
        MoveDirection::Up => index.checked_sub(1),
        MoveDirection::Down => {
            if index + 1 < list.len() {
                Some(index + 1)
            } else {
                None
            }
        }
    };
    if let Some(target) = target {
        list.swap(index, target);
    }
    true
}
