// Print Invoker Port
// Synchronous (awaited) call into the OS print subsystem with one ordered batch

use crate::domain::Artifact;
use async_trait::async_trait;
use thiserror::Error;

/// Print errors (terminal for the one batch that produced them)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrintError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Print command exited with {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Print command timeout after {0}ms")]
    Timeout(u64),

    #[error("Printer unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Print Invoker trait
///
/// Implementations:
/// - LprPrintInvoker: submits all artifacts to `lpr` as one job
/// - FakePrintInvoker: no-op that always succeeds (dry run)
/// - RecordingPrintInvoker: records calls for tests
#[async_trait]
pub trait PrintInvoker: Send + Sync {
    /// Submit `artifacts` as a single print job, in the given order
    ///
    /// # Arguments
    /// * `artifacts` - Ordered batch, never empty
    /// * `printer` - Target printer, `None` for the system default
    /// * `title` - Job title shown by the print subsystem
    async fn print(
        &self,
        artifacts: &[Artifact],
        printer: Option<&str>,
        title: &str,
    ) -> Result<(), PrintError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// One recorded print invocation
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PrintCall {
        pub artifacts: Vec<Artifact>,
        pub printer: Option<String>,
        pub title: String,
    }

    impl PrintCall {
        pub fn job_ids(&self) -> Vec<u64> {
            self.artifacts.iter().map(|a| a.job_id.value()).collect()
        }
    }

    /// Recording Print Invoker for testing
    pub struct RecordingPrintInvoker {
        calls: Arc<Mutex<Vec<PrintCall>>>,
        failing_calls: Arc<Mutex<HashSet<usize>>>,
        print_duration: Duration,
        notify: Arc<Notify>,
    }

    impl RecordingPrintInvoker {
        pub fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                failing_calls: Arc::new(Mutex::new(HashSet::new())),
                print_duration: Duration::ZERO,
                notify: Arc::new(Notify::new()),
            }
        }

        /// Simulate a slow printer
        pub fn with_print_duration(mut self, duration: Duration) -> Self {
            self.print_duration = duration;
            self
        }

        /// Make the n-th call (1-based) fail
        pub fn fail_call(&self, n: usize) {
            self.failing_calls.lock().unwrap().insert(n);
        }

        pub fn calls(&self) -> Vec<PrintCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Wait until at least `n` calls were recorded, or `within` elapses
        pub async fn wait_for_calls(&self, n: usize, within: Duration) -> bool {
            let deadline = tokio::time::Instant::now() + within;
            loop {
                let notified = self.notify.notified();
                if self.call_count() >= n {
                    return true;
                }
                if tokio::time::timeout_at(deadline, notified).await.is_err() {
                    return self.call_count() >= n;
                }
            }
        }
    }

    impl Default for RecordingPrintInvoker {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl PrintInvoker for RecordingPrintInvoker {
        async fn print(
            &self,
            artifacts: &[Artifact],
            printer: Option<&str>,
            title: &str,
        ) -> Result<(), PrintError> {
            if !self.print_duration.is_zero() {
                tokio::time::sleep(self.print_duration).await;
            }

            let call_number = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(PrintCall {
                    artifacts: artifacts.to_vec(),
                    printer: printer.map(str::to_string),
                    title: title.to_string(),
                });
                calls.len()
            };
            self.notify.notify_waiters();

            if self.failing_calls.lock().unwrap().contains(&call_number) {
                return Err(PrintError::Unavailable(format!(
                    "scripted failure for call #{}",
                    call_number
                )));
            }
            Ok(())
        }
    }
}
