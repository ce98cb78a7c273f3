//! Storage quota accounting.
//!
//! Sums `totalSizeBytes` across all track and video assets and compares the
//! figure against a fixed byte ceiling. The ceiling is advisory: the
//! accountant reports usage and an over-limit flag for display and never
//! blocks uploads.
//!
//! Legacy records that carry a remote URL but no recorded size are estimated
//! with a lightweight HEAD probe; each asset id is probed at most once per
//! session, whether or not the probe succeeds.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use greenroom_core::models::{TrackAsset, VideoAsset};

/// Usage summary for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaReport {
    pub used_bytes: u64,
    pub limit_bytes: u64,
    pub over_limit: bool,
}

/// Remote size estimation for assets with unknown sizes.
#[async_trait]
pub trait SizeProbe: Send + Sync {
    /// Best-effort content length of a remote URL. `None` on any failure.
    async fn content_length(&self, url: &str) -> Option<u64>;
}

/// HEAD-request probe restricted to a configured origin.
pub struct HttpSizeProbe {
    client: reqwest::Client,
    allowed_origin: Option<String>,
}

impl HttpSizeProbe {
    pub fn new(allowed_origin: Option<String>, timeout: Duration) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            allowed_origin,
        })
    }

    pub fn from_config(config: &greenroom_core::WizardConfig) -> Result<Self, anyhow::Error> {
        Self::new(
            config.probe_allowed_origin.clone(),
            Duration::from_secs(config.probe_timeout_secs),
        )
    }
}

#[async_trait]
impl SizeProbe for HttpSizeProbe {
    async fn content_length(&self, url: &str) -> Option<u64> {
        let origin = self.allowed_origin.as_deref()?;
        if !url.starts_with(origin) {
            tracing::debug!(url = %url, "Skipping size probe for foreign origin");
            return None;
        }

        let response = match self.client.head(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, url = %url, "Size probe request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            return None;
        }
        response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)?
            .to_str()
            .ok()?
            .parse()
            .ok()
    }
}

/// A probe that never resolves anything; used when probing is disabled.
pub struct NoopSizeProbe;

#[async_trait]
impl SizeProbe for NoopSizeProbe {
    async fn content_length(&self, _url: &str) -> Option<u64> {
        None
    }
}

pub struct QuotaAccountant {
    limit_bytes: u64,
    probe: std::sync::Arc<dyn SizeProbe>,
    /// Probe outcomes per asset id; presence means "already attempted".
    probed: Mutex<HashMap<Uuid, Option<u64>>>,
}

impl QuotaAccountant {
    pub fn new(limit_bytes: u64, probe: std::sync::Arc<dyn SizeProbe>) -> Self {
        Self {
            limit_bytes,
            probe,
            probed: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit_bytes(&self) -> u64 {
        self.limit_bytes
    }

    /// Aggregate bytes used across all given assets.
    pub async fn usage(&self, tracks: &[TrackAsset], videos: &[VideoAsset]) -> u64 {
        let mut total = 0u64;
        for track in tracks {
            let urls = [track.audio.url.as_deref(), track.cover.url.as_deref()];
            total += self.asset_bytes(track.id, track.total_size_bytes(), &urls).await;
        }
        for video in videos {
            let urls = [video.video.url.as_deref(), video.thumbnail.url.as_deref()];
            total += self.asset_bytes(video.id, video.total_size_bytes(), &urls).await;
        }
        total
    }

    pub async fn usage_report(&self, tracks: &[TrackAsset], videos: &[VideoAsset]) -> QuotaReport {
        let used_bytes = self.usage(tracks, videos).await;
        QuotaReport {
            used_bytes,
            limit_bytes: self.limit_bytes,
            over_limit: used_bytes > self.limit_bytes,
        }
    }

    async fn asset_bytes(&self, asset_id: Uuid, known: u64, urls: &[Option<&str>]) -> u64 {
        if known > 0 {
            return known;
        }

        {
            let probed = self.probed.lock().expect("quota cache lock poisoned");
            if let Some(cached) = probed.get(&asset_id) {
                return cached.unwrap_or(0);
            }
        }

        let mut estimated: Option<u64> = None;
        for url in urls.iter().flatten() {
            if let Some(bytes) = self.probe.content_length(url).await {
                estimated = Some(estimated.unwrap_or(0) + bytes);
            }
        }

        let mut probed = self.probed.lock().expect("quota cache lock poisoned");
        probed.insert(asset_id, estimated);
        estimated.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenroom_core::models::{MediaSlot, TrackRecord};
    use greenroom_core::{PendingFile, TrackAsset, VideoAsset};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProbe {
        size: Option<u64>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SizeProbe for CountingProbe {
        async fn content_length(&self, _url: &str) -> Option<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.size
        }
    }

    fn track(size: usize) -> TrackAsset {
        TrackAsset::new("T", "A", PendingFile::new("t.mp3", "audio/mpeg", vec![0u8; size]))
    }

    fn video(size: usize) -> VideoAsset {
        VideoAsset::new("V", PendingFile::new("v.mp4", "video/mp4", vec![0u8; size]))
    }

    fn legacy_track() -> TrackAsset {
        let record = TrackRecord {
            id: Uuid::new_v4(),
            title: "Old".to_string(),
            artist: "A".to_string(),
            audio_url: Some("https://media.test/old.mp3".to_string()),
            audio_storage_path: None,
            cover_url: None,
            cover_storage_path: None,
            audio_size_bytes: 0,
            cover_size_bytes: 0,
            total_size_bytes: 0,
        };
        TrackAsset::from_record(&record)
    }

    #[tokio::test]
    async fn test_usage_is_additive() {
        let accountant = QuotaAccountant::new(1000, std::sync::Arc::new(NoopSizeProbe));
        let tracks = vec![track(300), track(200)];
        let videos = vec![video(400)];
        assert_eq!(accountant.usage(&tracks, &videos).await, 900);

        let fewer = vec![track(300)];
        assert_eq!(accountant.usage(&fewer, &videos).await, 700);
    }

    #[tokio::test]
    async fn test_over_limit_flag() {
        let accountant = QuotaAccountant::new(500, std::sync::Arc::new(NoopSizeProbe));
        let report = accountant.usage_report(&[track(600)], &[]).await;
        assert!(report.over_limit);
        assert_eq!(report.used_bytes, 600);
        assert_eq!(report.limit_bytes, 500);
    }

    #[tokio::test]
    async fn test_legacy_asset_probed_once() {
        let probe = std::sync::Arc::new(CountingProbe {
            size: Some(12345),
            calls: AtomicUsize::new(0),
        });
        let accountant = QuotaAccountant::new(u64::MAX, probe.clone());
        let tracks = vec![legacy_track()];

        assert_eq!(accountant.usage(&tracks, &[]).await, 12345);
        assert_eq!(accountant.usage(&tracks, &[]).await, 12345);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_probe_not_retried() {
        let probe = std::sync::Arc::new(CountingProbe {
            size: None,
            calls: AtomicUsize::new(0),
        });
        let accountant = QuotaAccountant::new(u64::MAX, probe.clone());
        let tracks = vec![legacy_track()];

        assert_eq!(accountant.usage(&tracks, &[]).await, 0);
        assert_eq!(accountant.usage(&tracks, &[]).await, 0);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_track_without_url_not_probed() {
        let probe = std::sync::Arc::new(CountingProbe {
            size: Some(1),
            calls: AtomicUsize::new(0),
        });
        let accountant = QuotaAccountant::new(u64::MAX, probe.clone());

        let mut asset = legacy_track();
        asset.audio = MediaSlot::empty();
        assert_eq!(accountant.usage(&[asset], &[]).await, 0);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }
}
