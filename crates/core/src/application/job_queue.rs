// JobQueue - pending artifacts awaiting the next batch
//
// Pushed by any number of Fetcher units, drained only by the Batcher.
// Push and drain share one mutex so an artifact is never lost or duplicated.

use crate::domain::Artifact;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

#[derive(Default)]
struct QueueInner {
    pending: VecDeque<Artifact>,
    closed: bool,
}

/// Thread-safe unbounded queue of completed artifacts
#[derive(Default)]
pub struct JobQueue {
    inner: Mutex<QueueInner>,
    work_available: Notify,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        // A panic while holding the lock cannot leave the VecDeque half-updated
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an artifact and wake the Batcher.
    ///
    /// Returns the queue depth after the push, or gives the artifact back
    /// when the queue was closed by a shutdown flush.
    pub fn push(&self, artifact: Artifact) -> Result<usize, Artifact> {
        let depth = {
            let mut inner = self.lock();
            if inner.closed {
                return Err(artifact);
            }
            inner.pending.push_back(artifact);
            inner.pending.len()
        };
        self.work_available.notify_one();
        Ok(depth)
    }

    /// Atomically remove everything present right now, in insertion order
    pub fn drain(&self) -> Vec<Artifact> {
        self.lock().pending.drain(..).collect()
    }

    /// Drain and refuse all further pushes
    pub fn close(&self) -> Vec<Artifact> {
        let mut inner = self.lock();
        inner.closed = true;
        inner.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Resolve once the queue holds at least one artifact
    pub async fn wait_for_work(&self) {
        loop {
            // Register before checking so a concurrent push cannot slip between the two
            let notified = self.work_available.notified();
            if !self.is_empty() {
                return;
            }
            notified.await;
        }
    }
}
