//! Shared constants.

/// Soft cap on combined track + video storage per profile (3 GiB).
pub const MEDIA_STORAGE_LIMIT_BYTES: u64 = 3 * 1024 * 1024 * 1024;

/// Default hero image brightness percentage.
pub const DEFAULT_HERO_BRIGHTNESS: u8 = 100;

/// Default hero image vertical position percentage.
pub const DEFAULT_HERO_POSITION_Y: u8 = 50;

/// Root path segment under which all profile media is stored.
pub const DEFAULT_STORAGE_NAMESPACE: &str = "artists";

/// Quiet interval before a debounced field edit is written to the draft.
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 600;

/// Thumbnail frame offset: fraction of the video duration to seek to.
pub const THUMBNAIL_OFFSET_FRACTION: f64 = 0.1;

/// Thumbnail frame offset ceiling in seconds.
pub const THUMBNAIL_OFFSET_CAP_SECS: f64 = 1.0;

/// Seek target used when the video duration cannot be probed.
pub const THUMBNAIL_FALLBACK_OFFSET_SECS: f64 = 0.5;
