//! Shared key generation for storage backends.
//!
//! Key format: `{namespace}/{profileId}/{mediaKind}/{assetId}_{millis}.{ext}`.
//! The embedded timestamp guarantees uniqueness across re-uploads of the same
//! slot and can be parsed back out with [`parse_key_timestamp`].

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// The media families a storage key can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Hero,
    Audio,
    Cover,
    Video,
    Thumbnail,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Hero => "hero",
            MediaKind::Audio => "audio",
            MediaKind::Cover => "covers",
            MediaKind::Video => "videos",
            MediaKind::Thumbnail => "thumbnails",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Generate a storage key for one slot upload.
///
/// The extension is taken from `file_name` and sanitized; files without a
/// usable extension fall back to `bin`.
pub fn media_storage_key(
    namespace: &str,
    profile_id: Uuid,
    kind: MediaKind,
    asset_id: Uuid,
    uploaded_at: DateTime<Utc>,
    file_name: &str,
) -> String {
    format!(
        "{}/{}/{}/{}_{}.{}",
        namespace.trim_matches('/'),
        profile_id,
        kind.as_str(),
        asset_id,
        uploaded_at.timestamp_millis(),
        file_extension(file_name),
    )
}

/// Parse the upload timestamp embedded in a storage key produced by
/// [`media_storage_key`]. Returns `None` for keys in any other format.
pub fn parse_key_timestamp(storage_key: &str) -> Option<DateTime<Utc>> {
    let file_name = storage_key.rsplit('/').next()?;
    let stem = file_name.rsplit_once('.').map(|(s, _)| s).unwrap_or(file_name);
    let (_, millis) = stem.rsplit_once('_')?;
    let millis: i64 = millis.parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

fn file_extension(file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, e)| e)
        .unwrap_or("")
        .to_lowercase();
    let ext: String = ext.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if ext.is_empty() || ext.len() > 8 {
        "bin".to_string()
    } else {
        ext
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let profile_id = Uuid::new_v4();
        let asset_id = Uuid::new_v4();
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let key = media_storage_key("artists", profile_id, MediaKind::Audio, asset_id, at, "take one.MP3");
        assert_eq!(
            key,
            format!("artists/{}/audio/{}_1700000000000.mp3", profile_id, asset_id)
        );
    }

    #[test]
    fn test_keys_unique_across_reuploads() {
        let profile_id = Uuid::new_v4();
        let asset_id = Uuid::new_v4();
        let first = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let second = Utc.timestamp_millis_opt(1_700_000_000_001).unwrap();
        let a = media_storage_key("artists", profile_id, MediaKind::Hero, asset_id, first, "h.jpg");
        let b = media_storage_key("artists", profile_id, MediaKind::Hero, asset_id, second, "h.jpg");
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_key_timestamp_round_trip() {
        let at = Utc.timestamp_millis_opt(1_700_000_123_456).unwrap();
        let key = media_storage_key(
            "artists",
            Uuid::new_v4(),
            MediaKind::Video,
            Uuid::new_v4(),
            at,
            "live.mp4",
        );
        assert_eq!(parse_key_timestamp(&key), Some(at));
    }

    #[test]
    fn test_parse_key_timestamp_rejects_foreign_keys() {
        assert_eq!(parse_key_timestamp("artists/p/hero/no-timestamp.jpg"), None);
        assert_eq!(parse_key_timestamp("artists/p/hero/x_notanumber.jpg"), None);
    }

    #[test]
    fn test_extension_fallback() {
        let key = media_storage_key(
            "artists",
            Uuid::new_v4(),
            MediaKind::Cover,
            Uuid::new_v4(),
            Utc::now(),
            "noextension",
        );
        assert!(key.ends_with(".bin"));
    }
}
