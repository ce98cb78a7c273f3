//! Configuration module
//!
//! Runtime configuration for the wizard engine: storage namespace, quota cap,
//! thumbnail tooling, quota probing, and autosave timing. Values are loaded
//! from the environment with sensible defaults so the engine can run without
//! any configuration in tests and local development.

use std::env;
use std::str::FromStr;

use crate::constants;

/// Wizard engine configuration.
#[derive(Clone, Debug)]
pub struct WizardConfig {
    /// Root path segment for all storage keys, e.g. `artists`.
    pub storage_namespace: String,
    /// Soft cap on combined media usage in bytes.
    pub media_storage_limit_bytes: u64,
    /// Path to the ffmpeg binary used for thumbnail frame extraction.
    pub ffmpeg_path: String,
    /// Path to the ffprobe binary used for duration probing.
    pub ffprobe_path: String,
    /// Fraction of the video duration to seek to for the thumbnail frame.
    pub thumbnail_offset_fraction: f64,
    /// Ceiling in seconds for the thumbnail seek target.
    pub thumbnail_offset_cap_secs: f64,
    /// Origin prefix that quota size probes are restricted to. `None` disables probing.
    pub probe_allowed_origin: Option<String>,
    /// Timeout in seconds for a single quota size probe.
    pub probe_timeout_secs: u64,
    /// Quiet interval in milliseconds before a debounced field edit is persisted.
    pub autosave_debounce_ms: u64,
    /// Base directory for the local storage backend, when used.
    pub local_storage_path: Option<String>,
    /// Base URL the local storage backend serves files from, when used.
    pub local_storage_base_url: Option<String>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            storage_namespace: constants::DEFAULT_STORAGE_NAMESPACE.to_string(),
            media_storage_limit_bytes: constants::MEDIA_STORAGE_LIMIT_BYTES,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            thumbnail_offset_fraction: constants::THUMBNAIL_OFFSET_FRACTION,
            thumbnail_offset_cap_secs: constants::THUMBNAIL_OFFSET_CAP_SECS,
            probe_allowed_origin: None,
            probe_timeout_secs: 10,
            autosave_debounce_ms: constants::DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            local_storage_path: None,
            local_storage_base_url: None,
        }
    }
}

impl WizardConfig {
    /// Load configuration from the environment, falling back to defaults for
    /// anything unset. Invalid numeric values are an error rather than being
    /// silently replaced.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Ok(Self {
            storage_namespace: env::var("GREENROOM_STORAGE_NAMESPACE")
                .unwrap_or(defaults.storage_namespace),
            media_storage_limit_bytes: parse_env(
                "GREENROOM_MEDIA_STORAGE_LIMIT_BYTES",
                defaults.media_storage_limit_bytes,
            )?,
            ffmpeg_path: env::var("GREENROOM_FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: env::var("GREENROOM_FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
            thumbnail_offset_fraction: parse_env(
                "GREENROOM_THUMBNAIL_OFFSET_FRACTION",
                defaults.thumbnail_offset_fraction,
            )?,
            thumbnail_offset_cap_secs: parse_env(
                "GREENROOM_THUMBNAIL_OFFSET_CAP_SECS",
                defaults.thumbnail_offset_cap_secs,
            )?,
            probe_allowed_origin: env::var("GREENROOM_PROBE_ALLOWED_ORIGIN").ok(),
            probe_timeout_secs: parse_env(
                "GREENROOM_PROBE_TIMEOUT_SECS",
                defaults.probe_timeout_secs,
            )?,
            autosave_debounce_ms: parse_env(
                "GREENROOM_AUTOSAVE_DEBOUNCE_MS",
                defaults.autosave_debounce_ms,
            )?,
            local_storage_path: env::var("GREENROOM_LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("GREENROOM_LOCAL_STORAGE_BASE_URL").ok(),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}
