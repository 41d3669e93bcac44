// Document Fetcher Port
// Retrieves the document behind a PrintRequest and materializes it as an Artifact

use crate::domain::{Artifact, PrintRequest};
use async_trait::async_trait;
use thiserror::Error;

/// Fetch errors (terminal for the one request that produced them)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid document reference: {0}")]
    InvalidReference(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Document server answered {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Fetch aborted: {0}")]
    Aborted(String),
}

/// Document Fetcher trait
///
/// Implementations:
/// - HttpDocumentFetcher: HTTP GET with redirects, writes into the spool directory
/// - MockDocumentFetcher: scripted outcomes for tests
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Retrieve the document and store it as a uniquely named artifact
    ///
    /// # Errors
    /// - FetchError::Transport if the document cannot be retrieved
    /// - FetchError::Status if the server answers with a non-success status
    /// - FetchError::Storage if the artifact cannot be written
    async fn fetch(&self, request: &PrintRequest) -> Result<Artifact, FetchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock fetch behavior for one document reference
    #[derive(Debug, Clone)]
    pub enum MockFetchBehavior {
        /// Succeed after the given download time
        Succeed(Duration),
        /// Fail after the given download time
        Fail(Duration, String),
        /// Panic (for isolation testing)
        Panic(String),
    }

    /// Mock Document Fetcher for testing
    ///
    /// Unscripted references succeed immediately.
    pub struct MockDocumentFetcher {
        spool_dir: PathBuf,
        behaviors: Arc<Mutex<HashMap<String, MockFetchBehavior>>>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl MockDocumentFetcher {
        pub fn new() -> Self {
            Self {
                spool_dir: std::env::temp_dir().join("dymo-mock-spool"),
                behaviors: Arc::new(Mutex::new(HashMap::new())),
                requested: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn script(&self, url: impl Into<String>, behavior: MockFetchBehavior) {
            self.behaviors.lock().unwrap().insert(url.into(), behavior);
        }

        pub fn succeed_after(&self, url: impl Into<String>, delay: Duration) {
            self.script(url, MockFetchBehavior::Succeed(delay));
        }

        pub fn fail_after(&self, url: impl Into<String>, delay: Duration, msg: impl Into<String>) {
            self.script(url, MockFetchBehavior::Fail(delay, msg.into()));
        }

        pub fn call_count(&self) -> usize {
            self.requested.lock().unwrap().len()
        }

        /// Document URLs in the order `fetch` saw them
        pub fn requested_urls(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl Default for MockDocumentFetcher {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl DocumentFetcher for MockDocumentFetcher {
        async fn fetch(&self, request: &PrintRequest) -> Result<Artifact, FetchError> {
            self.requested
                .lock()
                .unwrap()
                .push(request.document_url.clone());

            let behavior = self
                .behaviors
                .lock()
                .unwrap()
                .get(&request.document_url)
                .cloned()
                .unwrap_or(MockFetchBehavior::Succeed(Duration::ZERO));

            match behavior {
                MockFetchBehavior::Succeed(delay) => {
                    tokio::time::sleep(delay).await;
                    let path = Artifact::path_for(&self.spool_dir, request.job_id);
                    let size = request.document_url.len() as u64;
                    Ok(Artifact::new(request.job_id, path, size))
                }
                MockFetchBehavior::Fail(delay, msg) => {
                    tokio::time::sleep(delay).await;
                    Err(FetchError::Transport(msg))
                }
                MockFetchBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for isolation testing
                }
            }
        }
    }
}
