// Print Service - the single owned coordinator for intake and dispatch
//
// Owns the job id counter, the JobQueue and the Batcher task. Every incoming
// request gets its own Fetcher unit; every Fetcher outcome is funneled through
// `record_fetch_outcome`, the one logging/statistics sink for fetches.

use crate::application::batcher::{Batcher, BatcherConfig, BatcherStats, StatsSnapshot};
use crate::application::constants::FIRST_JOB_ID;
use crate::application::job_queue::JobQueue;
use crate::domain::{Artifact, BatcherState, JobId, PrintRequest};
use crate::error::{AppError, Result};
use crate::port::{DocumentFetcher, FetchError, PrintInvoker, TimeProvider};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Intake + batch-dispatch coordinator
pub struct PrintService {
    fetcher: Arc<dyn DocumentFetcher>,
    queue: Arc<JobQueue>,
    stats: Arc<BatcherStats>,
    next_job_id: AtomicU64,
    accepting: AtomicBool,
    state_rx: watch::Receiver<BatcherState>,
    shutdown_tx: watch::Sender<bool>,
    batcher_handle: Mutex<Option<JoinHandle<()>>>,
}

impl PrintService {
    /// Validate the configuration and spawn the Batcher task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        config: BatcherConfig,
        fetcher: Arc<dyn DocumentFetcher>,
        invoker: Arc<dyn PrintInvoker>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let queue = Arc::new(JobQueue::new());
        let stats = Arc::new(BatcherStats::new());
        let batcher = Batcher::new(
            config,
            Arc::clone(&queue),
            invoker,
            Arc::clone(&stats),
            time_provider,
        );
        let state_rx = batcher.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let batcher_handle = tokio::spawn(batcher.run(shutdown_rx));

        Ok(Self {
            fetcher,
            queue,
            stats,
            next_job_id: AtomicU64::new(FIRST_JOB_ID),
            accepting: AtomicBool::new(true),
            state_rx,
            shutdown_tx,
            batcher_handle: Mutex::new(Some(batcher_handle)),
        })
    }

    /// Accept a print request and start its Fetcher unit.
    ///
    /// Returns as soon as the job id is assigned; the eventual fetch and
    /// print outcome is only observable through logs and [`Self::stats`].
    pub fn submit(
        &self,
        document_url: impl Into<String>,
        referer: Option<String>,
    ) -> Result<JobId> {
        if !self.accepting.load(Ordering::Acquire) {
            return Err(AppError::Unavailable(
                "print service is shutting down".to_string(),
            ));
        }

        let job_id = JobId::new(self.next_job_id.fetch_add(1, Ordering::SeqCst));
        let request = PrintRequest::new(job_id, document_url).with_referer(referer);
        self.stats.record_submitted();

        info!(
            job_id = %job_id,
            referer = request.referer.as_deref().unwrap_or("<unknown>"),
            "New print job"
        );

        let fetcher = Arc::clone(&self.fetcher);
        let queue = Arc::clone(&self.queue);
        let stats = Arc::clone(&self.stats);

        tokio::spawn(async move {
            let document_url = request.document_url.clone();
            debug!(job_id = %job_id, url = %document_url, "Processing job");

            // Inner task isolates panics in the transport from the sink below
            let handle = tokio::spawn(async move {
                request
                    .validate()
                    .map_err(|e| FetchError::InvalidReference(e.to_string()))?;
                fetcher.fetch(&request).await
            });

            let outcome = match handle.await {
                Ok(result) => result,
                Err(join_err) if join_err.is_panic() => {
                    Err(FetchError::Aborted("fetcher panicked".to_string()))
                }
                Err(join_err) => Err(FetchError::Aborted(join_err.to_string())),
            };

            record_fetch_outcome(&queue, &stats, job_id, &document_url, outcome);
        });

        Ok(job_id)
    }

    pub fn state(&self) -> BatcherState {
        *self.state_rx.borrow()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.queue.len(), self.state())
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Stop accepting requests, let the Batcher finish its cycle and flush
    /// the queue, waiting at most `grace`.
    pub async fn shutdown(&self, grace: Duration) -> Result<()> {
        self.accepting.store(false, Ordering::Release);
        // Receiver lives inside the Batcher task; a send error means it already exited
        let _ = self.shutdown_tx.send(true);

        let handle = self
            .batcher_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(handle) = handle else {
            return Ok(());
        };

        match tokio::time::timeout(grace, handle).await {
            Ok(Ok(())) => {
                info!(stats = ?self.stats(), "Print service stopped");
                Ok(())
            }
            Ok(Err(join_err)) => Err(AppError::Internal(format!(
                "batcher task failed: {}",
                join_err
            ))),
            Err(_) => Err(AppError::Internal(format!(
                "batcher did not stop within {}ms",
                grace.as_millis()
            ))),
        }
    }
}

/// The single sink for Fetcher outcomes
fn record_fetch_outcome(
    queue: &JobQueue,
    stats: &BatcherStats,
    job_id: JobId,
    document_url: &str,
    outcome: std::result::Result<Artifact, FetchError>,
) {
    match outcome {
        Ok(artifact) => match queue.push(artifact) {
            Ok(depth) => {
                stats.record_fetch_succeeded();
                debug!(job_id = %job_id, queue_depth = depth, "Rendered job");
            }
            Err(artifact) => {
                stats.record_fetch_failed();
                warn!(
                    job_id = %job_id,
                    artifact = %artifact.path.display(),
                    "Dropped artifact: batcher already stopped"
                );
            }
        },
        Err(e) => {
            stats.record_fetch_failed();
            error!(
                job_id = %job_id,
                url = %document_url,
                error = %e,
                "Failed to fetch print document"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::document_fetcher::mocks::{MockDocumentFetcher, MockFetchBehavior};
    use crate::port::print_invoker::mocks::RecordingPrintInvoker;
    use crate::port::time_provider::SystemTimeProvider;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl LogBuffer {
        fn lines_containing(&self, needle: &str) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .filter(|line| line.contains(needle))
                .map(str::to_string)
                .collect()
        }
    }

    fn start_service(
        fetcher: MockDocumentFetcher,
    ) -> (PrintService, Arc<RecordingPrintInvoker>) {
        let invoker = Arc::new(RecordingPrintInvoker::new());
        let service = PrintService::start(
            BatcherConfig::default(),
            Arc::new(fetcher),
            invoker.clone(),
            Arc::new(SystemTimeProvider),
        )
        .unwrap();
        (service, invoker)
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_ids_are_distinct_and_increasing() {
        let (service, _invoker) = start_service(MockDocumentFetcher::new());

        let ids: Vec<u64> = (0..5)
            .map(|i| service.submit(format!("http://docs/{}", i), None).unwrap().value())
            .collect();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_prints_once_in_completion_order() {
        let fetcher = MockDocumentFetcher::new();
        fetcher.succeed_after("http://docs/a", Duration::from_millis(150));
        fetcher.succeed_after("http://docs/b", Duration::from_millis(20));
        fetcher.succeed_after("http://docs/c", Duration::from_millis(80));
        let (service, invoker) = start_service(fetcher);

        let before = service.stats().prints_completed;
        service.submit("http://docs/a", None).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        service.submit("http://docs/b", None).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        service.submit("http://docs/c", None).unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;

        let calls = invoker.calls();
        assert_eq!(calls.len(), 1);
        // a completes at 150ms, b at 120ms, c at 280ms
        assert_eq!(calls[0].job_ids(), vec![2, 1, 3]);
        assert_eq!(service.stats().prints_completed, before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_is_dropped_and_others_print() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let fetcher = MockDocumentFetcher::new();
        fetcher.fail_after("http://docs/x", Duration::from_millis(50), "connection refused");
        fetcher.succeed_after("http://docs/y", Duration::from_millis(100));
        let (service, invoker) = start_service(fetcher);

        let x = service.submit("http://docs/x", None).unwrap();
        let y = service.submit("http://docs/y", None).unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;

        let calls = invoker.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].job_ids(), vec![y.value()]);
        assert_ne!(x, y);

        let stats = service.stats();
        assert_eq!(stats.fetches_failed, 1);
        assert_eq!(stats.fetches_succeeded, 1);

        // The failure is reported against X's job id, never Y's
        let failures = logs.lines_containing("Failed to fetch print document");
        assert_eq!(failures.len(), 1, "{:?}", failures);
        assert!(failures[0].contains(&format!("job_id={}", x)), "{}", failures[0]);
        assert!(failures[0].contains("http://docs/x"), "{}", failures[0]);
        assert!(failures[0].contains("connection refused"), "{}", failures[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_fetch_is_contained() {
        let fetcher = MockDocumentFetcher::new();
        fetcher.script("http://docs/boom", MockFetchBehavior::Panic("boom".to_string()));
        let (service, invoker) = start_service(fetcher);

        service.submit("http://docs/boom", None).unwrap();
        service.submit("http://docs/ok", None).unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(invoker.call_count(), 1);
        assert_eq!(invoker.calls()[0].job_ids(), vec![2]);
        assert_eq!(service.stats().fetches_failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_reference_never_reaches_fetcher() {
        let fetcher = Arc::new(MockDocumentFetcher::new());
        let invoker = Arc::new(RecordingPrintInvoker::new());
        let service = PrintService::start(
            BatcherConfig::default(),
            fetcher.clone(),
            invoker.clone(),
            Arc::new(SystemTimeProvider),
        )
        .unwrap();

        service.submit("", None).unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(invoker.call_count(), 0);
        assert_eq!(service.stats().fetches_failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_and_rejects_new_work() {
        let (service, invoker) = start_service(MockDocumentFetcher::new());

        service.submit("http://docs/a", None).unwrap();
        // Let the fetch land in the queue, but stay inside the debounce window
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(service.state(), BatcherState::Debouncing);

        service.shutdown(Duration::from_secs(5)).await.unwrap();

        assert_eq!(invoker.call_count(), 1);
        assert!(!service.is_accepting());
        assert!(matches!(
            service.submit("http://docs/b", None),
            Err(AppError::Unavailable(_))
        ));
        // Second shutdown is a no-op
        service.shutdown(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_config_rejected() {
        let result = PrintService::start(
            BatcherConfig::default().with_debounce(Duration::ZERO),
            Arc::new(MockDocumentFetcher::new()),
            Arc::new(RecordingPrintInvoker::new()),
            Arc::new(SystemTimeProvider),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
