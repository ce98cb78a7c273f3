//! Upload token registry.
//!
//! Every upload batch runs under a token issued here. Starting a new batch
//! for a media family invalidates any prior token for that family, and every
//! asynchronous continuation checks its captured token before touching shared
//! state: a stale continuation is a silent no-op. This is what stops a slow,
//! superseded upload from overwriting a newer one's result. The liveness flag
//! covers session teardown the same way.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// The three media families that upload as batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFamily {
    Hero,
    Tracks,
    Videos,
}

impl Display for MediaFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaFamily::Hero => write!(f, "hero"),
            MediaFamily::Tracks => write!(f, "tracks"),
            MediaFamily::Videos => write!(f, "videos"),
        }
    }
}

/// A batch's claim on its family. Copied into every continuation the batch
/// spawns and compared against the registry before any shared-state mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchToken {
    family: MediaFamily,
    seq: u64,
}

impl BatchToken {
    pub fn family(&self) -> MediaFamily {
        self.family
    }
}

#[derive(Debug)]
pub struct UploadTokenRegistry {
    hero: AtomicU64,
    tracks: AtomicU64,
    videos: AtomicU64,
    live: AtomicBool,
}

impl Default for UploadTokenRegistry {
    fn default() -> Self {
        Self {
            hero: AtomicU64::new(0),
            tracks: AtomicU64::new(0),
            videos: AtomicU64::new(0),
            live: AtomicBool::new(true),
        }
    }
}

impl UploadTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, family: MediaFamily) -> &AtomicU64 {
        match family {
            MediaFamily::Hero => &self.hero,
            MediaFamily::Tracks => &self.tracks,
            MediaFamily::Videos => &self.videos,
        }
    }

    /// Start a new batch for a family, invalidating any prior token.
    pub fn begin_batch(&self, family: MediaFamily) -> BatchToken {
        let seq = self.counter(family).fetch_add(1, Ordering::SeqCst) + 1;
        BatchToken { family, seq }
    }

    /// Whether a captured token still owns its family and the registry is
    /// still live.
    pub fn is_current(&self, token: BatchToken) -> bool {
        self.is_live() && self.counter(token.family).load(Ordering::SeqCst) == token.seq
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Tear down: every outstanding continuation becomes a no-op.
    pub fn shut_down(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}
