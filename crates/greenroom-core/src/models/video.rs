//! Video asset and its persisted record.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use super::slot::{MediaSlot, PendingFile};

/// State of the derived thumbnail pipeline for one video.
///
/// Thumbnail generation runs independently of the video upload; a failure
/// here is recorded on the asset and never fails the upload itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailState {
    Idle,
    Generating,
    Ready,
    Failed(String),
}

impl Display for ThumbnailState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ThumbnailState::Idle => write!(f, "idle"),
            ThumbnailState::Generating => write!(f, "generating"),
            ThumbnailState::Ready => write!(f, "ready"),
            ThumbnailState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// A video being edited in the wizard: the video file plus a derived thumbnail.
#[derive(Debug, Clone)]
pub struct VideoAsset {
    pub id: Uuid,
    pub title: String,
    pub video: MediaSlot,
    pub thumbnail: MediaSlot,
    pub thumbnail_state: ThumbnailState,
}

impl VideoAsset {
    pub fn new(title: impl Into<String>, video: PendingFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            video: MediaSlot::with_pending(video),
            thumbnail: MediaSlot::empty(),
            thumbnail_state: ThumbnailState::Idle,
        }
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.video.size_bytes + self.thumbnail.size_bytes
    }

    pub fn has_pending_upload(&self) -> bool {
        self.video.needs_upload() || self.thumbnail.needs_upload()
    }

    pub fn from_record(record: &VideoRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            video: MediaSlot::with_remote(
                record.video_url.clone(),
                record.video_storage_path.clone(),
                record.video_size_bytes,
            ),
            thumbnail: MediaSlot::with_remote(
                record.thumbnail_url.clone(),
                record.thumbnail_storage_path.clone(),
                record.thumbnail_size_bytes,
            ),
            thumbnail_state: if record.thumbnail_url.is_some() {
                ThumbnailState::Ready
            } else {
                ThumbnailState::Idle
            },
        }
    }

    pub fn to_record(&self) -> VideoRecord {
        VideoRecord {
            id: self.id,
            title: self.title.clone(),
            video_url: self.video.url.clone(),
            video_storage_path: self.video.storage_path.clone(),
            // Legacy readers look at `thumbnail`; keep it mirrored.
            thumbnail: self.thumbnail.url.clone(),
            thumbnail_url: self.thumbnail.url.clone(),
            thumbnail_storage_path: self.thumbnail.storage_path.clone(),
            video_size_bytes: self.video.size_bytes,
            thumbnail_size_bytes: self.thumbnail.size_bytes,
            total_size_bytes: self.total_size_bytes(),
        }
    }
}

/// Persisted video shape on the draft document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: Uuid,
    pub title: String,
    pub video_url: Option<String>,
    pub video_storage_path: Option<String>,
    pub thumbnail: Option<String>,
    pub thumbnail_url: Option<String>,
    pub thumbnail_storage_path: Option<String>,
    pub video_size_bytes: u64,
    pub thumbnail_size_bytes: u64,
    pub total_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_file(len: usize) -> PendingFile {
        PendingFile::new("live.mp4", "video/mp4", vec![0u8; len])
    }

    #[test]
    fn test_new_video_has_idle_thumbnail() {
        let video = VideoAsset::new("Live Set", video_file(4096));
        assert_eq!(video.thumbnail_state, ThumbnailState::Idle);
        assert_eq!(video.total_size_bytes(), 4096);
        assert!(video.has_pending_upload());
    }

    #[test]
    fn test_record_mirrors_thumbnail_url_into_legacy_field() {
        let mut video = VideoAsset::new("Live Set", video_file(10));
        video.thumbnail = MediaSlot::with_remote(
            Some("https://media.test/t.png".to_string()),
            Some("artists/p/thumbnails/t.png".to_string()),
            256,
        );
        let record = video.to_record();
        assert_eq!(record.thumbnail, record.thumbnail_url);
        assert_eq!(record.total_size_bytes, 10 + 256);
    }

    #[test]
    fn test_hydrated_video_with_thumbnail_is_ready() {
        let record = VideoRecord {
            id: Uuid::new_v4(),
            title: "Live Set".to_string(),
            video_url: Some("https://media.test/v.mp4".to_string()),
            video_storage_path: Some("artists/p/videos/v.mp4".to_string()),
            thumbnail: Some("https://media.test/t.png".to_string()),
            thumbnail_url: Some("https://media.test/t.png".to_string()),
            thumbnail_storage_path: Some("artists/p/thumbnails/t.png".to_string()),
            video_size_bytes: 4096,
            thumbnail_size_bytes: 256,
            total_size_bytes: 4352,
        };
        let asset = VideoAsset::from_record(&record);
        assert_eq!(asset.thumbnail_state, ThumbnailState::Ready);
        assert_eq!(asset.to_record(), record);
    }

    #[test]
    fn test_failed_thumbnail_state_displays_reason() {
        let state = ThumbnailState::Failed("no frames".to_string());
        assert_eq!(state.to_string(), "failed: no frames");
    }
}
