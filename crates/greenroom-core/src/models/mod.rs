pub mod draft;
pub mod hero;
pub mod slot;
pub mod track;
pub mod video;

pub use draft::{Draft, DraftStatus, WizardStep};
pub use hero::{HeroAsset, HeroMediaRecord};
pub use slot::{MediaSlot, PendingFile, SlotStatus};
pub use track::{TrackAsset, TrackRecord};
pub use video::{ThumbnailState, VideoAsset, VideoRecord};
