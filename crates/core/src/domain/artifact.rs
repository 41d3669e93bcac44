// Artifact Domain Model

use crate::domain::JobId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name prefix for downloaded label documents
pub const ARTIFACT_PREFIX: &str = "dymo-label-";

/// A retrieved document stored locally and ready for printing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub job_id: JobId,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl Artifact {
    pub fn new(job_id: JobId, path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            job_id,
            path: path.into(),
            size_bytes,
        }
    }

    /// Deterministic file name for a job (`dymo-label-<job_id>.pdf`)
    pub fn file_name_for(job_id: JobId) -> String {
        format!("{}{}.pdf", ARTIFACT_PREFIX, job_id)
    }

    /// Full artifact path for a job inside `spool_dir`
    pub fn path_for(spool_dir: &Path, job_id: JobId) -> PathBuf {
        spool_dir.join(Self::file_name_for(job_id))
    }

    /// File name used in log lines
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
