//! Logging setup
//!
//! `RUST_LOG` wins when set; otherwise `dymo=info` (or `dymo=debug` with the
//! config `debug` flag). `DYMO_LOG_FORMAT=json` switches to JSON lines.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FORMAT_ENV: &str = "DYMO_LOG_FORMAT";
const LOG_FILE_PREFIX: &str = "dymo-web-service.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Unknown values fall back to pretty
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

pub fn default_directives(debug: bool) -> &'static str {
    if debug {
        "dymo=debug,tower_http=debug"
    } else {
        "dymo=info,tower_http=info"
    }
}

/// Keeps the file writer flushing; drop only at process exit
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber. When `log_dir` is set, a daily rolling
/// file receives the same events (without ANSI colors).
pub fn init_logging(debug: bool, log_dir: Option<&Path>) -> Result<LogGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(debug)))
        .context("Failed to create env filter")?;

    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let format = LogFormat::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(file_layer)
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init()
        }
        LogFormat::Pretty => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(file_layer)
                .with(env_filter)
                .with(fmt::layer().pretty())
                .try_init()
        }
    }
    .context("Failed to install tracing subscriber")?;

    Ok(LogGuard { _file: file_guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(Some("xml")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
    }

    #[test]
    fn test_default_directives_parse() {
        for debug in [false, true] {
            assert!(EnvFilter::try_new(default_directives(debug)).is_ok());
        }
        assert!(default_directives(true).contains("dymo=debug"));
    }
}
