// lpr print invoker
// reason: tokio::process so a slow print subsystem never blocks the runtime
use async_trait::async_trait;
use std::ffi::OsString;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use dymo_core::domain::Artifact;
use dymo_core::error::{AppError, Result};
use dymo_core::port::{PrintError, PrintInvoker, TimeProvider};

/// Default print command
pub const DEFAULT_PRINT_COMMAND: &str = "lpr";

/// Submits a batch as ONE job: `<command> -T <title> [-P <printer>] <files...>`
pub struct LprPrintInvoker {
    program: String,
    leading_args: Vec<String>,
    print_timeout: Duration,
    time_provider: Arc<dyn TimeProvider>,
}

impl LprPrintInvoker {
    /// Create an invoker from a command line such as `lpr` or `lpr -o media=w79h252`
    ///
    /// # Arguments
    /// * `command_line` - Program followed by fixed leading arguments (whitespace separated)
    /// * `print_timeout` - Upper bound for one print command; the child is killed when exceeded
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let invoker = LprPrintInvoker::from_command_line(
    ///     "lpr",
    ///     Duration::from_secs(60),
    ///     Arc::new(SystemTimeProvider),
    /// )?;
    /// ```
    pub fn from_command_line(
        command_line: &str,
        print_timeout: Duration,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AppError::Config("print command is empty".to_string()))?;

        Ok(Self {
            program,
            leading_args: parts.collect(),
            print_timeout,
            time_provider,
        })
    }

    /// Arguments after the program name, in submission order
    fn build_args(&self, artifacts: &[Artifact], printer: Option<&str>, title: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.leading_args.iter().map(OsString::from).collect();

        args.push("-T".into());
        args.push(title.into());

        if let Some(printer) = printer {
            args.push("-P".into());
            args.push(printer.into());
        }

        args.extend(artifacts.iter().map(|a| a.path.as_os_str().to_os_string()));
        args
    }

    /// Spawn the print command and wait for its output
    async fn spawn_and_wait(&self, args: &[OsString]) -> std::result::Result<std::process::Output, PrintError> {
        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PrintError::SpawnFailed(format!("{}: {}", self.program, e)))?;

        match timeout(self.print_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(PrintError::IoError(e.to_string())),
            Err(_) => Err(PrintError::Timeout(self.print_timeout.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl PrintInvoker for LprPrintInvoker {
    async fn print(
        &self,
        artifacts: &[Artifact],
        printer: Option<&str>,
        title: &str,
    ) -> std::result::Result<(), PrintError> {
        let args = self.build_args(artifacts, printer, title);
        let start_time = self.time_provider.now_millis();

        info!(
            command = %self.program,
            args = ?args,
            "Printing"
        );

        let output = self.spawn_and_wait(&args).await?;
        let duration_ms = self.time_provider.now_millis() - start_time;

        if output.status.success() {
            info!(
                command = %self.program,
                duration_ms = %duration_ms,
                "Print command completed"
            );
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(
            command = %self.program,
            duration_ms = %duration_ms,
            exit_code = ?output.status.code(),
            stderr = %stderr,
            "Print command failed"
        );

        Err(PrintError::NonZeroExit {
            code: output.status.code(),
            stderr,
        })
    }
}
