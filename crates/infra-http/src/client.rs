// HTTP Client + Spool Directory Setup

use dymo_core::error::{AppError, Result};
use std::path::Path;
use std::time::Duration;

/// Maximum redirects followed for one document
pub const MAX_REDIRECTS: usize = 10;

/// Transport settings for document retrieval
#[derive(Debug, Clone)]
pub struct FetchClientConfig {
    /// Whole-request timeout (connect + headers + body)
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("dymo-web-service/{}", dymo_core::VERSION),
        }
    }
}

/// Build the shared HTTP client used by every Fetcher unit
pub fn build_client(config: &FetchClientConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| AppError::Config(format!("HTTP client setup failed: {}", e)))
}

/// Create the spool directory for artifacts if it does not exist yet
pub fn prepare_spool_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| {
        AppError::Config(format!(
            "cannot create spool directory {}: {}",
            path.display(),
            e
        ))
    })
}
