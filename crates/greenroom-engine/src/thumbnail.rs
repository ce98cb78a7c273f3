//! Video thumbnail generation.
//!
//! A derived side pipeline of the video upload flow: one frame is extracted
//! from early in the video (10% of the duration, capped at one second) and
//! encoded as PNG. Generation runs independently of the video file upload and
//! its failure is recorded on the asset, never propagated as a pipeline
//! failure.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::process::Stdio;
use tokio::process::Command;

use greenroom_core::constants::THUMBNAIL_FALLBACK_OFFSET_SECS;
use greenroom_core::WizardConfig;

/// A generated thumbnail frame.
#[derive(Debug, Clone)]
pub struct ThumbnailImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
}

#[async_trait]
pub trait ThumbnailGenerator: Send + Sync {
    /// Generate a thumbnail image from raw video bytes.
    async fn generate(&self, video: &[u8]) -> Result<ThumbnailImage>;
}

/// ffmpeg/ffprobe-backed thumbnail generator.
pub struct FfmpegThumbnailer {
    ffmpeg_path: String,
    ffprobe_path: String,
    offset_fraction: f64,
    offset_cap_secs: f64,
}

impl FfmpegThumbnailer {
    pub fn new(
        ffmpeg_path: String,
        ffprobe_path: String,
        offset_fraction: f64,
        offset_cap_secs: f64,
    ) -> Result<Self> {
        validate_binary_path(&ffmpeg_path)?;
        validate_binary_path(&ffprobe_path)?;
        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
            offset_fraction,
            offset_cap_secs,
        })
    }

    pub fn from_config(config: &WizardConfig) -> Result<Self> {
        Self::new(
            config.ffmpeg_path.clone(),
            config.ffprobe_path.clone(),
            config.thumbnail_offset_fraction,
            config.thumbnail_offset_cap_secs,
        )
    }

    /// Probe the video duration in seconds. `None` when the container does
    /// not report one.
    async fn probe_duration(&self, video_path: &std::path::Path) -> Result<Option<f64>> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
            ])
            .arg(video_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("ffprobe failed: {}", stderr));
        }

        let parsed: serde_json::Value =
            serde_json::from_slice(&output.stdout).context("Failed to parse ffprobe output")?;
        let duration = parsed["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok());
        Ok(duration)
    }

    fn seek_target(&self, duration: Option<f64>) -> f64 {
        match duration {
            Some(duration) if duration > 0.0 => {
                (duration * self.offset_fraction).clamp(0.0, self.offset_cap_secs)
            }
            _ => THUMBNAIL_FALLBACK_OFFSET_SECS,
        }
    }
}

#[async_trait]
impl ThumbnailGenerator for FfmpegThumbnailer {
    async fn generate(&self, video: &[u8]) -> Result<ThumbnailImage> {
        let input = tempfile::NamedTempFile::new().context("Failed to create temp input")?;
        tokio::fs::write(input.path(), video)
            .await
            .context("Failed to write temp input")?;

        let duration = self.probe_duration(input.path()).await.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Duration probe failed, using fallback seek target");
            None
        });
        let target = self.seek_target(duration);

        let output_dir = tempfile::tempdir().context("Failed to create temp output dir")?;
        let output_path = output_dir.path().join("frame.png");

        let output = Command::new(&self.ffmpeg_path)
            .args(["-ss", &format!("{:.3}", target), "-i"])
            .arg(input.path())
            .args(["-frames:v", "1", "-f", "image2", "-c:v", "png", "-y"])
            .arg(&output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("ffmpeg failed: {}", stderr));
        }

        let frame = tokio::fs::read(&output_path)
            .await
            .context("Failed to read extracted frame")?;

        let decoded = image::load_from_memory(&frame).context("Extracted frame is not a valid image")?;

        Ok(ThumbnailImage {
            bytes: Bytes::from(frame),
            width: decoded.width(),
            height: decoded.height(),
            content_type: "image/png",
        })
    }
}

fn validate_binary_path(path: &str) -> Result<()> {
    const DANGEROUS: [char; 11] = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| DANGEROUS.contains(&c)) {
        return Err(anyhow!("Invalid binary path: {:?}", path));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_target_uses_fraction_of_duration() {
        let thumbnailer =
            FfmpegThumbnailer::new("ffmpeg".into(), "ffprobe".into(), 0.1, 1.0).unwrap();
        assert_eq!(thumbnailer.seek_target(Some(5.0)), 0.5);
    }

    #[test]
    fn test_seek_target_capped_for_long_videos() {
        let thumbnailer =
            FfmpegThumbnailer::new("ffmpeg".into(), "ffprobe".into(), 0.1, 1.0).unwrap();
        assert_eq!(thumbnailer.seek_target(Some(120.0)), 1.0);
    }

    #[test]
    fn test_seek_target_fallback_without_duration() {
        let thumbnailer =
            FfmpegThumbnailer::new("ffmpeg".into(), "ffprobe".into(), 0.1, 1.0).unwrap();
        assert_eq!(thumbnailer.seek_target(None), THUMBNAIL_FALLBACK_OFFSET_SECS);
        assert_eq!(thumbnailer.seek_target(Some(0.0)), THUMBNAIL_FALLBACK_OFFSET_SECS);
    }

    #[test]
    fn test_rejects_dangerous_binary_paths() {
        assert!(FfmpegThumbnailer::new("ffmpeg; rm -rf /".into(), "ffprobe".into(), 0.1, 1.0).is_err());
        assert!(FfmpegThumbnailer::new("".into(), "ffprobe".into(), 0.1, 1.0).is_err());
    }
}
