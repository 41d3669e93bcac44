//! Daemon configuration
//!
//! INI file (section `[DymoLinux]`) layered under `DYMO__` environment
//! overrides, e.g. `DYMO__DYMOLINUX__FAKEPRINT=true`.

use dymo_core::application::BatcherConfig;
use dymo_core::error::{AppError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "DYMO_CONFIG";

/// Searched in order when neither argv[1] nor `DYMO_CONFIG` names a file
pub const CONFIG_CANDIDATES: &[&str] = &[
    "dymo-linux.ini",
    "/etc/dymo-linux.ini",
    "~/.config/dymo-linux.ini",
];

const ENV_PREFIX: &str = "DYMO";
const ENV_SEPARATOR: &str = "__";

const DEFAULT_DEBOUNCE_MS: u64 = 1000;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PRINT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PRINT_COMMAND: &str = "lpr";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT_FIRST: u16 = 41951;
const DEFAULT_PORT_LAST: u16 = 41960;

/// `[DymoLinux]` as written in the file. Unknown keys (dpi, sslcert, sslkey)
/// and other sections are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct DymoLinuxSection {
    printer: Option<String>,
    debug: bool,
    fakeprint: bool,
    debounce_ms: u64,
    spool_dir: Option<String>,
    keep_artifacts: bool,
    fetch_timeout_secs: u64,
    print_timeout_secs: u64,
    print_command: String,
    host: String,
    port_first: u16,
    port_last: u16,
    log_dir: Option<String>,
}

impl Default for DymoLinuxSection {
    fn default() -> Self {
        Self {
            printer: None,
            debug: false,
            fakeprint: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            spool_dir: None,
            keep_artifacts: false,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            print_timeout_secs: DEFAULT_PRINT_TIMEOUT_SECS,
            print_command: DEFAULT_PRINT_COMMAND.to_string(),
            host: DEFAULT_HOST.to_string(),
            port_first: DEFAULT_PORT_FIRST,
            port_last: DEFAULT_PORT_LAST,
            log_dir: None,
        }
    }
}

// Keys are lowercased by the config crate
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    dymolinux: DymoLinuxSection,
}

/// Resolved daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub printer: Option<String>,
    pub debug: bool,
    pub fakeprint: bool,
    pub debounce: Duration,
    pub spool_dir: PathBuf,
    pub keep_artifacts: bool,
    pub fetch_timeout: Duration,
    pub print_timeout: Duration,
    pub print_command: String,
    pub host: String,
    pub port_first: u16,
    pub port_last: u16,
    pub log_dir: Option<PathBuf>,

    /// File the values came from, `None` when running on defaults
    pub source: Option<PathBuf>,
}

impl DaemonConfig {
    /// Discover the config file and load it with environment overrides.
    ///
    /// # Arguments
    /// * `cli_arg` - First command line argument; must name an existing file when given
    pub fn load(cli_arg: Option<&str>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok();
        let path = discover_config_file(cli_arg, env_path.as_deref(), CONFIG_CANDIDATES)?;
        Self::load_from(path.as_deref(), None)
    }

    /// Load from `path` (or defaults only) plus environment overrides.
    ///
    /// `env` replaces the process environment as the override source when given.
    pub fn load_from(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Ini)
                    .required(true),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        );

        let raw: RawConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AppError::Config(e.to_string()))?;

        let config = Self::resolve(raw.dymolinux, path.map(Path::to_path_buf));
        config.validate()?;
        Ok(config)
    }

    fn resolve(section: DymoLinuxSection, source: Option<PathBuf>) -> Self {
        let spool_dir = section
            .spool_dir
            .filter(|s| !s.trim().is_empty())
            .map(|s| expand_path(&s))
            .unwrap_or_else(|| std::env::temp_dir().join("dymo-web-service"));

        Self {
            printer: section.printer.filter(|p| !p.trim().is_empty()),
            debug: section.debug,
            fakeprint: section.fakeprint,
            debounce: Duration::from_millis(section.debounce_ms),
            spool_dir,
            keep_artifacts: section.keep_artifacts,
            fetch_timeout: Duration::from_secs(section.fetch_timeout_secs),
            print_timeout: Duration::from_secs(section.print_timeout_secs),
            print_command: section.print_command,
            host: section.host,
            port_first: section.port_first,
            port_last: section.port_last,
            log_dir: section
                .log_dir
                .filter(|s| !s.trim().is_empty())
                .map(|s| expand_path(&s)),
            source,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.debounce.is_zero() {
            return Err(AppError::Config("debounce_ms must be greater than 0".into()));
        }
        if self.port_first > self.port_last {
            return Err(AppError::Config(format!(
                "port_first ({}) must not exceed port_last ({})",
                self.port_first, self.port_last
            )));
        }
        if self.fetch_timeout.is_zero() || self.print_timeout.is_zero() {
            return Err(AppError::Config("timeouts must be greater than 0".into()));
        }
        if self.print_command.trim().is_empty() {
            return Err(AppError::Config("print_command must not be empty".into()));
        }
        Ok(())
    }

    pub fn batcher_config(&self) -> BatcherConfig {
        BatcherConfig::default()
            .with_debounce(self.debounce)
            .with_printer(self.printer.clone())
            .with_retained_artifacts(self.keep_artifacts)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::resolve(DymoLinuxSection::default(), None)
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}

/// Pick the config file: argv[1], then `DYMO_CONFIG`, then the first
/// existing candidate. An explicitly named file must exist.
pub fn discover_config_file(
    cli_arg: Option<&str>,
    env_path: Option<&str>,
    candidates: &[&str],
) -> Result<Option<PathBuf>> {
    for (origin, explicit) in [("argument", cli_arg), (CONFIG_PATH_ENV, env_path)] {
        if let Some(raw) = explicit {
            let path = expand_path(raw);
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "config file {} (from {}) does not exist",
                    path.display(),
                    origin
                )));
            }
            return Ok(Some(path));
        }
    }

    Ok(candidates
        .iter()
        .map(|c| expand_path(c))
        .find(|p| p.is_file()))
}
