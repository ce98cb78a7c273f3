//! Uploadable slot model.
//!
//! A slot is one file position within an asset (a track's audio vs its cover,
//! a video's file vs its thumbnail). Over time a slot holds either a pending
//! local file awaiting upload or a confirmed remote location, never a stale
//! mix of both after an upload has settled: a successful upload clears the
//! pending file, a failed one retains it for user-initiated retry.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// An in-memory file handle awaiting upload.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl PendingFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// No file picked and nothing uploaded.
    Empty,
    /// A local file is waiting for the next upload batch.
    Pending,
    /// An upload for this slot is in flight.
    Uploading,
    /// The remote side is confirmed.
    Uploaded,
    /// The last upload attempt failed; the local file is retained.
    Error,
}

impl Default for SlotStatus {
    fn default() -> Self {
        SlotStatus::Empty
    }
}

impl Display for SlotStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SlotStatus::Empty => write!(f, "empty"),
            SlotStatus::Pending => write!(f, "pending"),
            SlotStatus::Uploading => write!(f, "uploading"),
            SlotStatus::Uploaded => write!(f, "uploaded"),
            SlotStatus::Error => write!(f, "error"),
        }
    }
}

/// One uploadable file position within an asset.
#[derive(Debug, Clone, Default)]
pub struct MediaSlot {
    pub pending: Option<PendingFile>,
    pub url: Option<String>,
    pub storage_path: Option<String>,
    /// Set when the remote side was confirmed by a settled upload this session.
    pub uploaded_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub status: SlotStatus,
}

impl MediaSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A slot freshly populated with a local file.
    pub fn with_pending(file: PendingFile) -> Self {
        let size_bytes = file.size_bytes();
        Self {
            pending: Some(file),
            url: None,
            storage_path: None,
            uploaded_at: None,
            size_bytes,
            status: SlotStatus::Pending,
        }
    }

    /// A slot hydrated from a persisted record.
    pub fn with_remote(url: Option<String>, storage_path: Option<String>, size_bytes: u64) -> Self {
        let status = if url.is_some() || storage_path.is_some() {
            SlotStatus::Uploaded
        } else {
            SlotStatus::Empty
        };
        Self {
            pending: None,
            url,
            storage_path,
            uploaded_at: None,
            size_bytes,
            status,
        }
    }

    /// Replace the slot contents with a newly picked local file. Any previous
    /// remote side stays recorded until a replacement upload settles.
    pub fn set_pending(&mut self, file: PendingFile) {
        self.size_bytes = file.size_bytes();
        self.pending = Some(file);
        self.status = SlotStatus::Pending;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether this slot needs a file upload in the next batch.
    pub fn needs_upload(&self) -> bool {
        self.pending.is_some() && self.status != SlotStatus::Uploading
    }

    pub fn mark_uploading(&mut self) {
        if self.pending.is_some() {
            self.status = SlotStatus::Uploading;
        }
    }

    /// Record a settled upload: the remote side becomes authoritative and the
    /// transient local file is released.
    pub fn confirm_upload(&mut self, url: String, storage_path: String, at: DateTime<Utc>) {
        self.url = Some(url);
        self.storage_path = Some(storage_path);
        self.uploaded_at = Some(at);
        self.pending = None;
        self.status = SlotStatus::Uploaded;
    }

    /// Record a failed upload. The local file is kept so the user can retry.
    pub fn mark_error(&mut self) {
        self.status = SlotStatus::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(name: &str, len: usize) -> PendingFile {
        PendingFile::new(name, "audio/mpeg", vec![0u8; len])
    }

    #[test]
    fn test_pending_slot_tracks_size() {
        let slot = MediaSlot::with_pending(pending("song.mp3", 1024));
        assert_eq!(slot.size_bytes, 1024);
        assert_eq!(slot.status, SlotStatus::Pending);
        assert!(slot.needs_upload());
    }

    #[test]
    fn test_confirm_upload_clears_pending() {
        let mut slot = MediaSlot::with_pending(pending("song.mp3", 10));
        slot.mark_uploading();
        slot.confirm_upload(
            "https://media.test/a.mp3".to_string(),
            "artists/p/audio/a.mp3".to_string(),
            Utc::now(),
        );
        assert!(slot.pending.is_none());
        assert_eq!(slot.status, SlotStatus::Uploaded);
        assert!(slot.uploaded_at.is_some());
        assert!(!slot.needs_upload());
    }

    #[test]
    fn test_failed_upload_retains_local_file() {
        let mut slot = MediaSlot::with_pending(pending("song.mp3", 10));
        slot.mark_uploading();
        slot.mark_error();
        assert!(slot.pending.is_some());
        assert_eq!(slot.status, SlotStatus::Error);
    }

    #[test]
    fn test_hydrated_slot_has_no_upload_time() {
        let slot = MediaSlot::with_remote(
            Some("https://media.test/a.mp3".to_string()),
            Some("artists/p/audio/a.mp3".to_string()),
            2048,
        );
        assert_eq!(slot.status, SlotStatus::Uploaded);
        assert!(slot.uploaded_at.is_none());
        assert!(!slot.needs_upload());
    }
}
