//! Last-run-wins bookkeeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::types::RunId;

/// Hands out increasing [`RunId`]s and answers whether a run is still the
/// newest one. Clones share the same counter.
///
/// Cancellation is cooperative: superseding a run does not abort its
/// in-flight request, the run simply discards what comes back.
#[derive(Debug, Clone, Default)]
pub struct RunTracker {
    current: Arc<AtomicU64>,
}

impl RunTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new run, superseding any run still in flight.
    pub fn begin(&self) -> RunId {
        RunId(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Supersedes the current run without starting another.
    pub fn cancel(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn is_current(&self, run: RunId) -> bool {
        self.current.load(Ordering::Acquire) == run.0
    }
}
