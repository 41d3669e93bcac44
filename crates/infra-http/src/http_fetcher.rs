// HTTP DocumentFetcher Implementation

use async_trait::async_trait;
use dymo_core::domain::{Artifact, PrintRequest};
use dymo_core::port::{DocumentFetcher, FetchError};
use std::path::{Path, PathBuf};
use tracing::debug;

// Helper to convert reqwest::Error to FetchError with structured information
fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Transport(format!("timed out: {}", err))
    } else if err.is_connect() {
        FetchError::Transport(format!("connection failed: {}", err))
    } else if err.is_redirect() {
        FetchError::Transport(format!("too many redirects: {}", err))
    } else if let Some(status) = err.status() {
        FetchError::Status {
            status: status.as_u16(),
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
        }
    } else if err.is_body() || err.is_decode() {
        FetchError::Transport(format!("body read failed: {}", err))
    } else {
        FetchError::Transport(err.to_string())
    }
}

/// Downloads documents over HTTP(S) into the spool directory
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
    spool_dir: PathBuf,
}

impl HttpDocumentFetcher {
    /// # Arguments
    /// * `client` - Shared client (timeouts and redirect policy configured by `build_client`)
    /// * `spool_dir` - Existing directory receiving `dymo-label-<job_id>.pdf` artifacts
    pub fn new(client: reqwest::Client, spool_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            spool_dir: spool_dir.into(),
        }
    }

    fn parse_reference(reference: &str) -> Result<reqwest::Url, FetchError> {
        let url = reqwest::Url::parse(reference.trim())
            .map_err(|e| FetchError::InvalidReference(format!("{}: {}", reference, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(FetchError::InvalidReference(format!(
                "unsupported scheme '{}' in {}",
                other, reference
            ))),
        }
    }

    /// Write via a `.part` file so a failed write never leaves a
    /// half-written artifact under the final name
    async fn store(&self, path: &Path, body: &[u8]) -> Result<(), FetchError> {
        let partial = path.with_extension("pdf.part");

        if let Err(e) = tokio::fs::write(&partial, body).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(FetchError::Storage(format!("{}: {}", partial.display(), e)));
        }

        tokio::fs::rename(&partial, path)
            .await
            .map_err(|e| FetchError::Storage(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, request: &PrintRequest) -> Result<Artifact, FetchError> {
        let url = Self::parse_reference(&request.document_url)?;

        debug!(job_id = %request.job_id, url = %url, "Downloading document");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let final_url = response.url().clone();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        let path = Artifact::path_for(&self.spool_dir, request.job_id);
        self.store(&path, &body).await?;

        debug!(
            job_id = %request.job_id,
            final_url = %final_url,
            size_bytes = body.len(),
            path = %path.display(),
            "Stored artifact"
        );

        Ok(Artifact::new(request.job_id, path, body.len() as u64))
    }
}
