//! Batch progress aggregation.
//!
//! Combines per-file progress events from the concurrent pipelines of one
//! batch into a single 0–100 figure:
//! `batch = (completed / total) * 100 + current_file / total`, clamped and
//! monotonically non-decreasing within the batch. A batch with nothing to
//! upload completes immediately at 100%.
//!
//! Each batch gets its own aggregator; a superseded batch keeps writing into
//! its own (no longer observed) channel, so stale updates never reach the
//! current figure.

use std::sync::Mutex;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Idle,
    Uploading,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchProgressSnapshot {
    pub status: BatchStatus,
    pub percent: f64,
}

impl BatchProgressSnapshot {
    pub fn idle() -> Self {
        Self {
            status: BatchStatus::Idle,
            percent: 0.0,
        }
    }

    pub fn complete() -> Self {
        Self {
            status: BatchStatus::Complete,
            percent: 100.0,
        }
    }
}

#[derive(Debug)]
struct Inner {
    completed: usize,
    current_file_percent: f64,
    reported: f64,
    any_failed: bool,
}

#[derive(Debug)]
pub struct BatchProgress {
    total_files: usize,
    inner: Mutex<Inner>,
    tx: watch::Sender<BatchProgressSnapshot>,
}

impl BatchProgress {
    /// Start tracking a batch of `total_files` uploads. With zero files the
    /// published snapshot is immediately `Complete` at 100%.
    pub fn start(total_files: usize) -> (std::sync::Arc<Self>, watch::Receiver<BatchProgressSnapshot>) {
        let initial = if total_files == 0 {
            BatchProgressSnapshot::complete()
        } else {
            BatchProgressSnapshot {
                status: BatchStatus::Uploading,
                percent: 0.0,
            }
        };
        let (tx, rx) = watch::channel(initial);
        let progress = std::sync::Arc::new(Self {
            total_files,
            inner: Mutex::new(Inner {
                completed: 0,
                current_file_percent: 0.0,
                reported: if total_files == 0 { 100.0 } else { 0.0 },
                any_failed: false,
            }),
            tx,
        });
        (progress, rx)
    }

    /// Progress event for the file currently in flight, 0–100.
    pub fn file_progress(&self, percent: f64) {
        let mut inner = self.inner.lock().expect("progress lock poisoned");
        inner.current_file_percent = percent.clamp(0.0, 100.0);
        self.publish(&mut inner);
    }

    /// One file settled successfully.
    pub fn file_completed(&self) {
        let mut inner = self.inner.lock().expect("progress lock poisoned");
        inner.completed = (inner.completed + 1).min(self.total_files);
        inner.current_file_percent = 0.0;
        self.publish(&mut inner);
    }

    /// One file settled with an error. It still counts toward batch
    /// settlement; the batch status ends up `Error` instead of `Complete`.
    pub fn file_failed(&self) {
        let mut inner = self.inner.lock().expect("progress lock poisoned");
        inner.any_failed = true;
        inner.completed = (inner.completed + 1).min(self.total_files);
        inner.current_file_percent = 0.0;
        self.publish(&mut inner);
    }

    pub fn snapshot(&self) -> BatchProgressSnapshot {
        *self.tx.borrow()
    }

    fn publish(&self, inner: &mut Inner) {
        let computed = if self.total_files == 0 {
            100.0
        } else {
            let total = self.total_files as f64;
            (inner.completed as f64 / total) * 100.0 + inner.current_file_percent / total
        };
        inner.reported = inner.reported.max(computed.clamp(0.0, 100.0));

        let status = if inner.completed >= self.total_files {
            if inner.any_failed {
                BatchStatus::Error
            } else {
                BatchStatus::Complete
            }
        } else {
            BatchStatus::Uploading
        };

        let _ = self.tx.send(BatchProgressSnapshot {
            status,
            percent: inner.reported,
        });
    }
}
