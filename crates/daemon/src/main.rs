//! Dymo Web Service Clone - Main Entry Point
//!
//! Serves the DYMO Label Web Service protocol on localhost and prints the
//! submitted labels in debounced batches through the OS print system.

mod config;
mod listener;
mod logging;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use dymo_api_http::{router, serve, AppState};
use dymo_core::application::constants::DEFAULT_SHUTDOWN_GRACE;
use dymo_core::application::PrintService;
use dymo_core::port::time_provider::SystemTimeProvider;
use dymo_core::port::{PrintInvoker, TimeProvider};
use dymo_infra_http::{build_client, prepare_spool_dir, FetchClientConfig, HttpDocumentFetcher};
use dymo_infra_system::{FakePrintInvoker, LprPrintInvoker};

use crate::config::DaemonConfig;
use crate::listener::bind_first_free_port;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (logged once the subscriber exists)
    let cli_arg = std::env::args().nth(1);
    let config = DaemonConfig::load(cli_arg.as_deref()).context("Invalid configuration")?;

    // 2. Initialize logging
    let _log_guard = logging::init_logging(config.debug, config.log_dir.as_deref())?;

    info!("Dymo Web Service Clone v{} starting...", VERSION);
    match &config.source {
        Some(path) => info!(path = %path.display(), "Loaded configuration"),
        None => warn!("No configuration file found, using defaults"),
    }
    if config.fakeprint {
        warn!("Fakeprint enabled, labels will not be sent to a printer");
    }

    // 3. Setup dependencies (DI wiring)
    prepare_spool_dir(&config.spool_dir)?;
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);

    let client = build_client(&FetchClientConfig {
        timeout: config.fetch_timeout,
        ..Default::default()
    })?;
    let fetcher = Arc::new(HttpDocumentFetcher::new(client, &config.spool_dir));

    let invoker: Arc<dyn PrintInvoker> = if config.fakeprint {
        Arc::new(FakePrintInvoker::new())
    } else {
        Arc::new(LprPrintInvoker::from_command_line(
            &config.print_command,
            config.print_timeout,
            time_provider.clone(),
        )?)
    };

    // 4. Start the Batcher
    let service = Arc::new(PrintService::start(
        config.batcher_config(),
        fetcher,
        invoker,
        time_provider,
    )?);

    info!(
        spool_dir = %config.spool_dir.display(),
        printer = config.printer.as_deref().unwrap_or("<default>"),
        debounce_ms = config.debounce.as_millis() as u64,
        keep_artifacts = config.keep_artifacts,
        "Print service ready"
    );

    // 5. Start the HTTP listener
    let listener = bind_first_free_port(&config.host, config.port_first..=config.port_last).await?;
    let app = router(AppState::new(Arc::clone(&service), config.debug));

    info!("Press Ctrl+C to shutdown");
    serve(listener, app, shutdown_signal()).await?;

    // 6. Graceful shutdown: flush pending labels
    info!("Shutdown signal received. Flushing pending labels...");
    service.shutdown(DEFAULT_SHUTDOWN_GRACE).await?;

    let stats = service.stats();
    info!(
        jobs_submitted = stats.jobs_submitted,
        fetches_failed = stats.fetches_failed,
        batches_printed = stats.batches_printed,
        batches_failed = stats.batches_failed,
        artifacts_printed = stats.artifacts_printed,
        "Shutdown complete."
    );

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
