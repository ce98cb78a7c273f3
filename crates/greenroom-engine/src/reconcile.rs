//! Draft reconciliation.
//!
//! Merges the wizard's in-memory asset lists against the remotely persisted
//! lists by id. The merge is asymmetric on purpose: uploads settle in the
//! background and may have been persisted by a batch after the last remote
//! read, so URL and storage-path fields are taken from the remote record
//! unless the local slot holds a strictly newer confirmed upload. Editable
//! metadata (title, artist, ordering) always comes from the local list, and
//! `mediaUsageBytes` is recomputed from the merged result rather than patched
//! incrementally.

use std::collections::HashMap;
use uuid::Uuid;

use greenroom_core::models::{MediaSlot, TrackAsset, TrackRecord, VideoAsset, VideoRecord};
use greenroom_storage::parse_key_timestamp;

/// Merge local tracks against the persisted list.
pub fn reconcile_tracks(local: &[TrackAsset], remote: &[TrackRecord]) -> Vec<TrackRecord> {
    let remote_by_id: HashMap<Uuid, &TrackRecord> =
        remote.iter().map(|record| (record.id, record)).collect();

    local
        .iter()
        .map(|asset| {
            let mut record = asset.to_record();
            if let Some(remote) = remote_by_id.get(&asset.id) {
                merge_slot(
                    &asset.audio,
                    SlotFields {
                        url: &mut record.audio_url,
                        storage_path: &mut record.audio_storage_path,
                        size_bytes: &mut record.audio_size_bytes,
                    },
                    remote.audio_url.as_deref(),
                    remote.audio_storage_path.as_deref(),
                    remote.audio_size_bytes,
                );
                merge_slot(
                    &asset.cover,
                    SlotFields {
                        url: &mut record.cover_url,
                        storage_path: &mut record.cover_storage_path,
                        size_bytes: &mut record.cover_size_bytes,
                    },
                    remote.cover_url.as_deref(),
                    remote.cover_storage_path.as_deref(),
                    remote.cover_size_bytes,
                );
                record.total_size_bytes = record.audio_size_bytes + record.cover_size_bytes;
            }
            record
        })
        .collect()
}

/// Merge local videos against the persisted list.
pub fn reconcile_videos(local: &[VideoAsset], remote: &[VideoRecord]) -> Vec<VideoRecord> {
    let remote_by_id: HashMap<Uuid, &VideoRecord> =
        remote.iter().map(|record| (record.id, record)).collect();

    local
        .iter()
        .map(|asset| {
            let mut record = asset.to_record();
            if let Some(remote) = remote_by_id.get(&asset.id) {
                merge_slot(
                    &asset.video,
                    SlotFields {
                        url: &mut record.video_url,
                        storage_path: &mut record.video_storage_path,
                        size_bytes: &mut record.video_size_bytes,
                    },
                    remote.video_url.as_deref(),
                    remote.video_storage_path.as_deref(),
                    remote.video_size_bytes,
                );
                merge_slot(
                    &asset.thumbnail,
                    SlotFields {
                        url: &mut record.thumbnail_url,
                        storage_path: &mut record.thumbnail_storage_path,
                        size_bytes: &mut record.thumbnail_size_bytes,
                    },
                    remote.thumbnail_url.as_deref(),
                    remote.thumbnail_storage_path.as_deref(),
                    remote.thumbnail_size_bytes,
                );
                record.thumbnail = record.thumbnail_url.clone();
                record.total_size_bytes = record.video_size_bytes + record.thumbnail_size_bytes;
            }
            record
        })
        .collect()
}

/// Recompute the draft's aggregate media usage from persisted records.
pub fn media_usage_bytes(tracks: &[TrackRecord], videos: &[VideoRecord]) -> u64 {
    let track_bytes: u64 = tracks.iter().map(|t| t.total_size_bytes).sum();
    let video_bytes: u64 = videos.iter().map(|v| v.total_size_bytes).sum();
    track_bytes + video_bytes
}

struct SlotFields<'a> {
    url: &'a mut Option<String>,
    storage_path: &'a mut Option<String>,
    size_bytes: &'a mut u64,
}

fn merge_slot(
    local: &MediaSlot,
    fields: SlotFields<'_>,
    remote_url: Option<&str>,
    remote_path: Option<&str>,
    remote_size: u64,
) {
    if local_slot_wins(local, remote_path) {
        return;
    }
    if remote_url.is_none() && remote_path.is_none() {
        // Remote has nothing for this slot; keep whatever the local record
        // carries rather than nulling it out.
        return;
    }
    *fields.url = remote_url.map(str::to_string);
    *fields.storage_path = remote_path.map(str::to_string);
    if *fields.size_bytes == 0 {
        *fields.size_bytes = remote_size;
    }
}

/// Local wins only for a slot whose upload was confirmed this session and is
/// strictly newer than the remote record's path timestamp. A remote path in
/// an unrecognized format counts as newest, keeping the remote-wins default.
fn local_slot_wins(local: &MediaSlot, remote_path: Option<&str>) -> bool {
    if local.url.is_none() {
        return false;
    }
    let Some(local_at) = local.uploaded_at else {
        return false;
    };
    match remote_path {
        None => true,
        Some(path) => match parse_key_timestamp(path) {
            Some(remote_at) => local_at > remote_at,
            None => false,
        },
    }
}
