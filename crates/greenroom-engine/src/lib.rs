//! Greenroom Engine
//!
//! The asynchronous media-upload and draft-reconciliation engine behind the
//! performer profile-creation wizard: concurrent, cancellable,
//! progress-tracked uploads per media family; garbage collection of
//! superseded storage paths; reconciliation of locally-edited asset lists
//! against the persisted draft; and soft storage-quota accounting.

pub mod debounce;
pub mod error;
pub mod paths;
mod pipeline;
pub mod profile;
pub mod progress;
pub mod quota;
pub mod reconcile;
pub mod session;
pub mod thumbnail;
pub mod token;
pub mod wizard;

// Re-export commonly used types
pub use debounce::{DebouncedFieldWriter, DraftField};
pub use error::{EngineError, EngineResult};
pub use paths::StoragePathTracker;
pub use profile::ProfileService;
pub use progress::{BatchProgress, BatchProgressSnapshot, BatchStatus};
pub use quota::{HttpSizeProbe, NoopSizeProbe, QuotaAccountant, QuotaReport, SizeProbe};
pub use reconcile::{media_usage_bytes, reconcile_tracks, reconcile_videos};
pub use session::{HeroEditUpdate, MoveDirection, WizardSession, WizardState};
pub use thumbnail::{FfmpegThumbnailer, ThumbnailGenerator, ThumbnailImage};
pub use token::{BatchToken, MediaFamily, UploadTokenRegistry};
pub use wizard::{HeroEditState, HeroMode, StepChange, StepMachine};
