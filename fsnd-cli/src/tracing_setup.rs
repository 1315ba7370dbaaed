//! Tracing setup for the fsnd CLI
//!
//! Usage:
//!   fsnd --debug serve trivia          # Debug logging to console only
//!   RUST_LOG=fsnd_server=debug fsnd    # Fine-grained log control
//!
//! Without `RUST_LOG` or `--debug`, the `[log] level` from the config
//! file is used (default: info). Outside debug mode `serve` also writes
//! to the `[log] file` error log (default: error.log).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Enable debug logging (overrides the configured level)
    pub debug: bool,
    /// Level from the config file
    pub level: String,
    /// Error log file, ignored in debug mode
    pub error_log: Option<PathBuf>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: "info".to_string(),
            error_log: None,
        }
    }
}

impl TracingConfig {
    /// Directive used when `RUST_LOG` is not set
    fn default_directive(&self) -> &str {
        if self.debug {
            "debug"
        } else if self.level.trim().is_empty() {
            "info"
        } else {
            self.level.trim()
        }
    }

    /// File to log to, if any
    fn log_file(&self) -> Option<&Path> {
        if self.debug {
            None
        } else {
            self.error_log.as_deref()
        }
    }
}

/// Open `path` for appending, creating its directory first.
fn open_log_file(path: &Path) -> Result<RollingFileAppender> {
    let name = path
        .file_name()
        .ok_or_else(|| anyhow!("Log file path has no file name: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Initialize console tracing, plus the error log file when configured.
///
/// The returned guard flushes the file writer when dropped, so it must be
/// held until the process exits.
pub fn init(config: &TracingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let console_layer = fmt::layer()
        .with_target(config.debug) // Show targets in debug mode
        .compact();

    let (file_layer, guard) = match config.log_file() {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(guard)
}
