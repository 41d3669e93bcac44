// Print Request Domain Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-wide job identifier.
///
/// Assigned from a monotonically increasing counter starting at 1. Used for
/// log correlation and artifact naming only, never for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(u64);

impl JobId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A request to print the document behind `document_url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintRequest {
    pub job_id: JobId,
    pub document_url: String,
    /// Origin of the request as reported by the caller (for logging only)
    pub referer: Option<String>,
}

impl PrintRequest {
    pub fn new(job_id: JobId, document_url: impl Into<String>) -> Self {
        Self {
            job_id,
            document_url: document_url.into(),
            referer: None,
        }
    }

    pub fn with_referer(mut self, referer: Option<String>) -> Self {
        self.referer = referer;
        self
    }

    /// Reject references that no transport could resolve
    pub fn validate(&self) -> crate::domain::error::Result<()> {
        if self.document_url.trim().is_empty() {
            return Err(crate::domain::error::DomainError::InvalidReference(
                "document reference is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_display() {
        assert_eq!(JobId::new(42).to_string(), "42");
    }

    #[test]
    fn test_empty_reference_rejected() {
        let request = PrintRequest::new(JobId::new(1), "   ");
        assert!(request.validate().is_err());

        let request = PrintRequest::new(JobId::new(2), "https://example.com/label.pdf");
        assert!(request.validate().is_ok());
    }
}
