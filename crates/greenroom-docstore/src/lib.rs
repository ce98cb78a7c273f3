//! Draft document store abstraction.
//!
//! The engine persists the wizard's resumable draft through the [`DraftStore`]
//! trait. Writes are partial: a [`DraftPatch`] only touches the fields it
//! carries, so persisting `tracks` never clobbers unrelated fields like `bio`.

pub mod memory;
pub mod patch;
pub mod traits;

pub use memory::MemoryDraftStore;
pub use patch::DraftPatch;
pub use traits::{DraftStore, DraftStoreError, DraftStoreResult};
