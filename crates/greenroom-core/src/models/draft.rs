//! The resumable draft document: the persisted projection the engine reads
//! and writes while a profile is being created.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use super::hero::HeroMediaRecord;
use super::track::TrackRecord;
use super::video::VideoRecord;
use crate::constants::{DEFAULT_HERO_BRIGHTNESS, DEFAULT_HERO_POSITION_Y};

/// Ordered wizard steps. The serialized names are part of the draft schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    HeroImage,
    StageName,
    Bio,
    Videos,
    Tracks,
    TechRider,
}

impl WizardStep {
    pub const ORDER: [WizardStep; 6] = [
        WizardStep::HeroImage,
        WizardStep::StageName,
        WizardStep::Bio,
        WizardStep::Videos,
        WizardStep::Tracks,
        WizardStep::TechRider,
    ];

    pub fn first() -> Self {
        Self::ORDER[0]
    }

    pub fn index(self) -> usize {
        Self::ORDER.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Option<Self> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        let index = self.index();
        if index == 0 {
            None
        } else {
            Some(Self::ORDER[index - 1])
        }
    }

    pub fn is_final(self) -> bool {
        self == *Self::ORDER.last().unwrap_or(&WizardStep::TechRider)
    }
}

impl Display for WizardStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            WizardStep::HeroImage => "hero-image",
            WizardStep::StageName => "stage-name",
            WizardStep::Bio => "bio",
            WizardStep::Videos => "videos",
            WizardStep::Tracks => "tracks",
            WizardStep::TechRider => "tech-rider",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Draft,
    Complete,
}

/// The draft document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub profile_id: Uuid,
    pub name: String,
    pub bio: String,
    pub hero_media: Option<HeroMediaRecord>,
    pub hero_brightness: u8,
    pub hero_position_y: u8,
    pub tracks: Vec<TrackRecord>,
    pub videos: Vec<VideoRecord>,
    pub last_stage: WizardStep,
    pub status: DraftStatus,
    pub is_complete: bool,
    pub media_usage_bytes: u64,
}

impl Draft {
    /// A freshly created, empty draft.
    pub fn new(profile_id: Uuid) -> Self {
        Self {
            profile_id,
            name: String::new(),
            bio: String::new(),
            hero_media: None,
            hero_brightness: DEFAULT_HERO_BRIGHTNESS,
            hero_position_y: DEFAULT_HERO_POSITION_Y,
            tracks: Vec::new(),
            videos: Vec::new(),
            last_stage: WizardStep::first(),
            status: DraftStatus::Draft,
            is_complete: false,
            media_usage_bytes: 0,
        }
    }
}
