//! Track asset and its persisted record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slot::{MediaSlot, PendingFile};

/// A track being edited in the wizard: audio slot plus optional cover art.
#[derive(Debug, Clone)]
pub struct TrackAsset {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub audio: MediaSlot,
    pub cover: MediaSlot,
}

impl TrackAsset {
    /// A new track from a freshly picked audio file.
    pub fn new(title: impl Into<String>, artist: impl Into<String>, audio: PendingFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            artist: artist.into(),
            audio: MediaSlot::with_pending(audio),
            cover: MediaSlot::empty(),
        }
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.audio.size_bytes + self.cover.size_bytes
    }

    pub fn has_pending_upload(&self) -> bool {
        self.audio.needs_upload() || self.cover.needs_upload()
    }

    /// Hydrate an asset from a persisted record, e.g. when resuming a draft.
    pub fn from_record(record: &TrackRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            artist: record.artist.clone(),
            audio: MediaSlot::with_remote(
                record.audio_url.clone(),
                record.audio_storage_path.clone(),
                record.audio_size_bytes,
            ),
            cover: MediaSlot::with_remote(
                record.cover_url.clone(),
                record.cover_storage_path.clone(),
                record.cover_size_bytes,
            ),
        }
    }

    /// Project the asset into its persisted shape using only locally known
    /// fields. Reconciliation against the remote list happens separately.
    pub fn to_record(&self) -> TrackRecord {
        TrackRecord {
            id: self.id,
            title: self.title.clone(),
            artist: self.artist.clone(),
            audio_url: self.audio.url.clone(),
            audio_storage_path: self.audio.storage_path.clone(),
            cover_url: self.cover.url.clone(),
            cover_storage_path: self.cover.storage_path.clone(),
            audio_size_bytes: self.audio.size_bytes,
            cover_size_bytes: self.cover.size_bytes,
            total_size_bytes: self.total_size_bytes(),
        }
    }
}

/// Persisted track shape on the draft document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub audio_url: Option<String>,
    pub audio_storage_path: Option<String>,
    pub cover_url: Option<String>,
    pub cover_storage_path: Option<String>,
    pub audio_size_bytes: u64,
    pub cover_size_bytes: u64,
    pub total_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio_file(len: usize) -> PendingFile {
        PendingFile::new("take1.mp3", "audio/mpeg", vec![0u8; len])
    }

    #[test]
    fn test_new_track_sizes() {
        let track = TrackAsset::new("Take One", "The Band", audio_file(3072));
        assert_eq!(track.total_size_bytes(), 3072);
        assert!(track.has_pending_upload());
    }

    #[test]
    fn test_record_round_trip_preserves_remote_fields() {
        let record = TrackRecord {
            id: Uuid::new_v4(),
            title: "Take One".to_string(),
            artist: "The Band".to_string(),
            audio_url: Some("https://media.test/a.mp3".to_string()),
            audio_storage_path: Some("artists/p/audio/a.mp3".to_string()),
            cover_url: None,
            cover_storage_path: None,
            audio_size_bytes: 3072,
            cover_size_bytes: 0,
            total_size_bytes: 3072,
        };
        let asset = TrackAsset::from_record(&record);
        assert!(!asset.has_pending_upload());
        assert_eq!(asset.to_record(), record);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = TrackAsset::new("Take One", "The Band", audio_file(10)).to_record();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("audioSizeBytes").is_some());
        assert!(json.get("totalSizeBytes").is_some());
        assert!(json.get("audio_size_bytes").is_none());
    }
}
