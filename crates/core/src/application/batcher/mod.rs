// Batcher - debounce/single-flight print dispatch
//
// One long-lived task owns the drain+print cycle, so at most one BatchCycle
// runs at any instant:
//
//   Idle --(queue non-empty)--> Debouncing --(timer)--> Draining --> Printing --> Idle
//
// Artifacts arriving during a cycle stay in the JobQueue and trigger the next
// cycle as soon as the current one is back in Idle.

mod config;
mod stats;

pub use config::BatcherConfig;
pub use stats::{BatcherStats, StatsSnapshot};

use crate::application::constants::FIRST_BATCH_ID;
use crate::application::job_queue::JobQueue;
use crate::domain::{Artifact, BatchCycle, BatchOutcome, BatcherState};
use crate::port::{PrintError, PrintInvoker, TimeProvider};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// What woke the Batcher while Idle
enum Trigger {
    Work,
    Shutdown,
}

/// Debounce/single-flight coordinator draining the JobQueue into print jobs
pub struct Batcher {
    config: BatcherConfig,
    queue: Arc<JobQueue>,
    invoker: Arc<dyn PrintInvoker>,
    stats: Arc<BatcherStats>,
    time_provider: Arc<dyn TimeProvider>,
    state_tx: watch::Sender<BatcherState>,
    next_batch_id: AtomicU64,
}

impl Batcher {
    pub fn new(
        config: BatcherConfig,
        queue: Arc<JobQueue>,
        invoker: Arc<dyn PrintInvoker>,
        stats: Arc<BatcherStats>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let (state_tx, _) = watch::channel(BatcherState::Idle);
        Self {
            config,
            queue,
            invoker,
            stats,
            time_provider,
            state_tx,
            next_batch_id: AtomicU64::new(FIRST_BATCH_ID),
        }
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<BatcherState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> BatcherState {
        *self.state_tx.borrow()
    }

    fn advance(&self, to: BatcherState) {
        self.state_tx.send_modify(|state| match state.transition(to) {
            Ok(next) => *state = next,
            Err(e) => {
                error!(error = %e, "Batcher state machine violated, forcing state");
                *state = to;
            }
        });
        debug!(state = %to, "Batcher state changed");
    }

    /// Run the Batcher until `shutdown` flips to true.
    ///
    /// A cycle that has started draining always completes. Shutdown during
    /// Idle or Debouncing closes the queue and prints whatever it holds as a
    /// final batch without waiting out the rest of the debounce window.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            debounce_ms = self.config.debounce.as_millis() as u64,
            printer = self.config.printer.as_deref().unwrap_or("<default>"),
            "Batcher started"
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            match self.wait_for_trigger(&mut shutdown).await {
                Trigger::Shutdown => break,
                Trigger::Work => {
                    self.advance(BatcherState::Debouncing);
                    if let Trigger::Shutdown = self.debounce(&mut shutdown).await {
                        break;
                    }
                    self.advance(BatcherState::Draining);
                    let artifacts = self.queue.drain();
                    self.run_cycle(artifacts).await;
                }
            }
        }

        self.flush_on_shutdown().await;
        info!(
            prints_completed = self.stats.prints_completed(),
            "Batcher stopped"
        );
    }

    async fn wait_for_trigger(&self, shutdown: &mut watch::Receiver<bool>) -> Trigger {
        loop {
            tokio::select! {
                _ = self.queue.wait_for_work() => return Trigger::Work,
                changed = shutdown.changed() => {
                    if is_shutdown(changed, shutdown) {
                        return Trigger::Shutdown;
                    }
                }
            }
        }
    }

    /// Sit out the debounce window; `Work` once it elapsed
    async fn debounce(&self, shutdown: &mut watch::Receiver<bool>) -> Trigger {
        let window = tokio::time::sleep(self.config.debounce);
        tokio::pin!(window);

        loop {
            tokio::select! {
                _ = &mut window => return Trigger::Work,
                changed = shutdown.changed() => {
                    if is_shutdown(changed, shutdown) {
                        debug!("Shutdown during debounce window");
                        return Trigger::Shutdown;
                    }
                }
            }
        }
    }

    async fn flush_on_shutdown(&self) {
        self.advance(BatcherState::Draining);
        let leftovers = self.queue.close();
        if !leftovers.is_empty() {
            info!(
                artifact_count = leftovers.len(),
                "Flushing pending artifacts before shutdown"
            );
        }
        self.run_cycle(leftovers).await;
    }

    /// Draining -> Printing -> Idle for one drained set of artifacts.
    ///
    /// Returns the finished cycle, or `None` when there was nothing to print.
    async fn run_cycle(&self, artifacts: Vec<Artifact>) -> Option<BatchCycle> {
        if artifacts.is_empty() {
            debug!("Nothing left to drain");
            self.advance(BatcherState::Idle);
            return None;
        }

        let batch_id = self.next_batch_id.fetch_add(1, Ordering::SeqCst);
        self.advance(BatcherState::Printing);

        let mut cycle = BatchCycle::new(batch_id, artifacts, self.time_provider.now_millis());
        debug!(
            batch_id = batch_id,
            artifact_count = cycle.artifacts.len(),
            "Aggregating jobs into single print"
        );

        let result = self.invoke_isolated(&cycle).await;
        let now = self.time_provider.now_millis();
        let batch_size = cycle.artifacts.len();

        match result {
            Ok(()) => {
                cycle.finish(BatchOutcome::Printed, now);
                info!(
                    batch_id = batch_id,
                    artifact_count = batch_size,
                    duration_ms = cycle.duration_ms().unwrap_or_default(),
                    "Printed batch"
                );
                if !self.config.retain_artifacts {
                    remove_artifacts(&cycle.artifacts).await;
                }
            }
            Err(e) => {
                cycle.finish(BatchOutcome::Failed(e.to_string()), now);
                error!(
                    batch_id = batch_id,
                    artifacts = ?cycle.artifact_names(),
                    error = %e,
                    "Batch print failed; artifacts kept for diagnostics"
                );
            }
        }

        self.stats
            .record_print(batch_size, matches!(cycle.outcome, Some(BatchOutcome::Printed)));
        self.advance(BatcherState::Idle);
        Some(cycle)
    }

    /// Call the PrintInvoker on its own task so a panicking invoker fails
    /// the batch instead of killing the Batcher
    async fn invoke_isolated(&self, cycle: &BatchCycle) -> Result<(), PrintError> {
        let invoker = Arc::clone(&self.invoker);
        let artifacts = cycle.artifacts.clone();
        let printer = self.config.printer.clone();
        let title = cycle.title();

        let handle = tokio::spawn(async move {
            invoker
                .print(&artifacts, printer.as_deref(), &title)
                .await
        });

        match handle.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => Err(PrintError::Unavailable(
                "print invoker panicked".to_string(),
            )),
            Err(join_err) => Err(PrintError::Unavailable(join_err.to_string())),
        }
    }
}

// A dropped sender also means nobody can feed us anymore
fn is_shutdown(
    changed: std::result::Result<(), watch::error::RecvError>,
    shutdown: &watch::Receiver<bool>,
) -> bool {
    changed.is_err() || *shutdown.borrow()
}

/// Delete printed artifacts; a missing file is not an error
async fn remove_artifacts(artifacts: &[Artifact]) {
    for artifact in artifacts {
        match tokio::fs::remove_file(&artifact.path).await {
            Ok(()) => debug!(artifact = %artifact.name(), "Removed artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                artifact = %artifact.path.display(),
                error = %e,
                "Failed to remove artifact"
            ),
        }
    }
}
