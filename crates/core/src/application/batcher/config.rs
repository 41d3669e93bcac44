//! Configuration for the Batcher.

use crate::application::constants::DEFAULT_DEBOUNCE;
use crate::error::{AppError, Result};
use std::time::Duration;

/// Configuration for the debounce/single-flight Batcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatcherConfig {
    /// Quiet window after the first arrival during which further artifacts
    /// are coalesced into the same print job
    pub debounce: Duration,

    /// Target printer, `None` for the system default
    pub printer: Option<String>,

    /// Keep artifacts on disk after a successful print.
    /// Artifacts of a failed batch are always kept for diagnostics.
    pub retain_artifacts: bool,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            printer: None,
            retain_artifacts: false,
        }
    }
}

impl BatcherConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_printer(mut self, printer: Option<String>) -> Self {
        self.printer = printer.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_retained_artifacts(mut self, retain: bool) -> Self {
        self.retain_artifacts = retain;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.debounce.is_zero() {
            return Err(AppError::Config(
                "debounce window must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BatcherConfig::default();
        assert_eq!(config.debounce, Duration::from_secs(1));
        assert_eq!(config.printer, None);
        assert!(!config.retain_artifacts);
        tokio_test::assert_ok!(config.validate());
    }

    #[test]
    fn test_blank_printer_means_default_printer() {
        let config = BatcherConfig::default().with_printer(Some("  ".to_string()));
        assert_eq!(config.printer, None);

        let config = BatcherConfig::default().with_printer(Some("DYMO_LabelWriter_450".to_string()));
        assert_eq!(config.printer.as_deref(), Some("DYMO_LabelWriter_450"));
    }

    #[test]
    fn test_zero_debounce_rejected() {
        let config = BatcherConfig::default().with_debounce(Duration::ZERO);
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }
}
