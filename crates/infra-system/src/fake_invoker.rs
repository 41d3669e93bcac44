// Fake print invoker (dry run)

use async_trait::async_trait;
use dymo_core::domain::Artifact;
use dymo_core::port::{PrintError, PrintInvoker};
use tracing::info;

/// Logs the batch it would have printed and reports success
#[derive(Debug, Default, Clone, Copy)]
pub struct FakePrintInvoker;

impl FakePrintInvoker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PrintInvoker for FakePrintInvoker {
    async fn print(
        &self,
        artifacts: &[Artifact],
        printer: Option<&str>,
        title: &str,
    ) -> Result<(), PrintError> {
        let files: Vec<String> = artifacts.iter().map(Artifact::name).collect();
        info!(
            title = %title,
            printer = ?printer,
            files = ?files,
            "Fakeprint enabled, not really printing"
        );
        Ok(())
    }
}
