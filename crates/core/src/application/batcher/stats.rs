//! Counters for the intake and batch-dispatch pipeline.

use crate::domain::BatcherState;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Pipeline counters, shared between Fetcher units and the Batcher
#[derive(Debug, Default)]
pub struct BatcherStats {
    /// Print requests accepted by the coordinator
    pub jobs_submitted: AtomicU64,

    /// Fetches that produced an artifact
    pub fetches_succeeded: AtomicU64,

    /// Fetches that failed, panicked, or completed after shutdown
    pub fetches_failed: AtomicU64,

    /// Batches whose print call succeeded
    pub batches_printed: AtomicU64,

    /// Batches whose print call failed
    pub batches_failed: AtomicU64,

    /// Artifacts included in successfully printed batches
    pub artifacts_printed: AtomicU64,

    /// Completed print invocations, successful or not
    pub prints_completed: AtomicU64,

    /// Largest batch observed
    pub max_batch_size: AtomicU64,
}

impl BatcherStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submitted(&self) {
        self.jobs_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_succeeded(&self) {
        self.fetches_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished print invocation for a batch of `batch_size` artifacts
    pub fn record_print(&self, batch_size: usize, succeeded: bool) {
        if succeeded {
            self.batches_printed.fetch_add(1, Ordering::Relaxed);
            self.artifacts_printed
                .fetch_add(batch_size as u64, Ordering::Relaxed);
        } else {
            self.batches_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.max_batch_size
            .fetch_max(batch_size as u64, Ordering::Relaxed);
        self.prints_completed.fetch_add(1, Ordering::Release);
    }

    pub fn prints_completed(&self) -> u64 {
        self.prints_completed.load(Ordering::Acquire)
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self, queue_depth: usize, state: BatcherState) -> StatsSnapshot {
        StatsSnapshot {
            jobs_submitted: self.jobs_submitted.load(Ordering::Relaxed),
            fetches_succeeded: self.fetches_succeeded.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            batches_printed: self.batches_printed.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            artifacts_printed: self.artifacts_printed.load(Ordering::Relaxed),
            prints_completed: self.prints_completed(),
            max_batch_size: self.max_batch_size.load(Ordering::Relaxed),
            queue_depth,
            state,
        }
    }
}

/// Serializable snapshot of [`BatcherStats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub jobs_submitted: u64,
    pub fetches_succeeded: u64,
    pub fetches_failed: u64,
    pub batches_printed: u64,
    pub batches_failed: u64,
    pub artifacts_printed: u64,
    pub prints_completed: u64,
    pub max_batch_size: u64,
    pub queue_depth: usize,
    pub state: BatcherState,
}
