//! Hero image asset and its persisted record.

use serde::{Deserialize, Serialize};

use super::slot::{MediaSlot, PendingFile};
use crate::constants::{DEFAULT_HERO_BRIGHTNESS, DEFAULT_HERO_POSITION_Y};

/// The profile's hero (background) image plus its presentation settings.
#[derive(Debug, Clone)]
pub struct HeroAsset {
    pub slot: MediaSlot,
    /// Display brightness percentage, 60–140.
    pub brightness: u8,
    /// Vertical position percentage, 0–100.
    pub position_y: u8,
}

impl Default for HeroAsset {
    fn default() -> Self {
        Self {
            slot: MediaSlot::empty(),
            brightness: DEFAULT_HERO_BRIGHTNESS,
            position_y: DEFAULT_HERO_POSITION_Y,
        }
    }
}

impl HeroAsset {
    /// Replace the hero image with a freshly picked file. Brightness resets;
    /// the position is kept so repositioning work is not lost.
    pub fn pick(&mut self, file: PendingFile) {
        self.slot.set_pending(file);
        self.brightness = DEFAULT_HERO_BRIGHTNESS;
    }

    pub fn has_image(&self) -> bool {
        self.slot.has_pending() || self.slot.url.is_some()
    }

    pub fn to_record(&self) -> Option<HeroMediaRecord> {
        match (&self.slot.url, &self.slot.storage_path) {
            (Some(url), path) => Some(HeroMediaRecord {
                url: url.clone(),
                storage_path: path.clone(),
            }),
            _ => None,
        }
    }

    pub fn hydrate(record: &HeroMediaRecord, brightness: u8, position_y: u8) -> Self {
        Self {
            slot: MediaSlot::with_remote(
                Some(record.url.clone()),
                record.storage_path.clone(),
                0,
            ),
            brightness,
            position_y,
        }
    }
}

/// Persisted hero image shape on the draft root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroMediaRecord {
    pub url: String,
    pub storage_path: Option<String>,
}
