//! Typed partial update for the draft document.

use greenroom_core::models::{
    DraftStatus, HeroMediaRecord, TrackRecord, VideoRecord, WizardStep,
};

/// A partial draft write. `None` fields are left untouched by the store.
///
/// `hero_media` is doubly optional: the outer `Option` is presence on the
/// patch, the inner one allows clearing the hero image.
#[derive(Debug, Clone, Default)]
pub struct DraftPatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub hero_media: Option<Option<HeroMediaRecord>>,
    pub hero_brightness: Option<u8>,
    pub hero_position_y: Option<u8>,
    pub tracks: Option<Vec<TrackRecord>>,
    pub videos: Option<Vec<VideoRecord>>,
    pub last_stage: Option<WizardStep>,
    pub status: Option<DraftStatus>,
    pub is_complete: Option<bool>,
    pub media_usage_bytes: Option<u64>,
}

impl DraftPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.bio.is_none()
            && self.hero_media.is_none()
            && self.hero_brightness.is_none()
            && self.hero_position_y.is_none()
            && self.tracks.is_none()
            && self.videos.is_none()
            && self.last_stage.is_none()
            && self.status.is_none()
            && self.is_complete.is_none()
            && self.media_usage_bytes.is_none()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn hero_media(mut self, hero: Option<HeroMediaRecord>) -> Self {
        self.hero_media = Some(hero);
        self
    }

    pub fn hero_brightness(mut self, brightness: u8) -> Self {
        self.hero_brightness = Some(brightness);
        self
    }

    pub fn hero_position_y(mut self, position_y: u8) -> Self {
        self.hero_position_y = Some(position_y);
        self
    }

    pub fn tracks(mut self, tracks: Vec<TrackRecord>) -> Self {
        self.tracks = Some(tracks);
        self
    }

    pub fn videos(mut self, videos: Vec<VideoRecord>) -> Self {
        self.videos = Some(videos);
        self
    }

    pub fn last_stage(mut self, step: WizardStep) -> Self {
        self.last_stage = Some(step);
        self
    }

    pub fn status(mut self, status: DraftStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_complete(mut self, complete: bool) -> Self {
        self.is_complete = Some(complete);
        self
    }

    pub fn media_usage_bytes(mut self, bytes: u64) -> Self {
        self.media_usage_bytes = Some(bytes);
        self
    }

    /// Fold this patch into another, with `self`'s fields taking precedence.
    pub fn merge_over(self, mut base: DraftPatch) -> DraftPatch {
        macro_rules! take {
            ($field:ident) => {
                if self.$field.is_some() {
                    base.$field = self.$field;
                }
            };
        }
        take!(name);
        take!(bio);
        take!(hero_media);
        take!(hero_brightness);
        take!(hero_position_y);
        take!(tracks);
        take!(videos);
        take!(last_stage);
        take!(status);
        take!(is_complete);
        take!(media_usage_bytes);
        base
    }
}
