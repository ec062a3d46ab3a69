//! Shared progress and cancellation handle for Monte Carlo runs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// Lifecycle of a Monte Carlo run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Idle,
    Running,
    Complete,
    /// Configuration was rejected
    Failed,
    /// Stopped between trials on request; partial trials are discarded
    Cancelled,
}

impl RunStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RunStatus::Running,
            2 => RunStatus::Complete,
            3 => RunStatus::Failed,
            4 => RunStatus::Cancelled,
            _ => RunStatus::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            RunStatus::Idle => 0,
            RunStatus::Running => 1,
            RunStatus::Complete => 2,
            RunStatus::Failed => 3,
            RunStatus::Cancelled => 4,
        }
    }

    /// Whether the run has reached a terminal state
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            RunStatus::Complete | RunStatus::Failed | RunStatus::Cancelled
        )
    }
}

/// Progress tracking for a Monte Carlo run.
///
/// Clones share the same atomics, so a caller can keep one handle to poll
/// progress or request cancellation while the run executes elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
    status: Arc<AtomicU8>,
}

impl MonteCarloProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trials finished so far
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Total number of trials in the current run
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Fraction of trials finished, in [0, 1]
    #[must_use]
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.completed() as f64 / total as f64
        }
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        RunStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// Request cancellation; honoured between trials
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Return to `Idle` and clear counters and any pending cancellation
    pub fn reset(&self) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(0, Ordering::Relaxed);
        self.cancelled.store(false, Ordering::SeqCst);
        self.set_status(RunStatus::Idle);
    }

    pub(crate) fn begin(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        self.set_status(RunStatus::Running);
    }

    pub(crate) fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_status(&self, status: RunStatus) {
        self.status.store(status.as_u8(), Ordering::SeqCst);
    }
}
