//! Greenroom Core Library
//!
//! This crate provides the domain models, configuration, and constants shared
//! across all Greenroom components: media assets and their uploadable slots,
//! the persisted draft document shapes, and the wizard step vocabulary.

pub mod config;
pub mod constants;
pub mod format;
pub mod models;

// Re-export commonly used types
pub use config::WizardConfig;
pub use format::format_file_size;
pub use models::{
    Draft, DraftStatus, HeroAsset, HeroMediaRecord, MediaSlot, PendingFile, SlotStatus,
    ThumbnailState, TrackAsset, TrackRecord, VideoAsset, VideoRecord, WizardStep,
};
