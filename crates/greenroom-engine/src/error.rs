//! Error types for the wizard engine.
//!
//! Background upload pipelines never surface errors through this type: their
//! failures are converted to per-asset status flags at the pipeline boundary.
//! `EngineError` covers the operations a caller awaits directly.

use thiserror::Error;
use uuid::Uuid;

use greenroom_core::WizardStep;
use greenroom_docstore::DraftStoreError;
use greenroom_storage::StorageError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Draft store error: {0}")]
    Draft(#[from] DraftStoreError),

    #[error("Draft not found: {0}")]
    DraftNotFound(Uuid),

    #[error("Asset not found: {0}")]
    AssetNotFound(Uuid),

    #[error("Step '{0}' is not ready to advance")]
    StepNotReady(WizardStep),

    #[error("Already at the final step")]
    AtFinalStep,

    #[error("Invalid hero edit transition: {0}")]
    InvalidHeroEdit(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
