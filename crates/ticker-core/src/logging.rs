//! File logging.
//!
//! The terminal belongs to the renderer, so logs go to
//! `$TICKER_HOME/logs/ticker.log`. The filter comes from `TICKER_LOG` when
//! set, otherwise from the configured level.

use std::fs;

use anyhow::{Context, Result};
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::paths;

/// Environment variable holding a log filter directive.
pub const LOG_ENV: &str = "TICKER_LOG";

pub const LOG_FILE_NAME: &str = "ticker.log";

/// Installs the global subscriber.
///
/// Keep the returned guard alive for the lifetime of the program; dropping
/// it flushes and stops the background writer.
///
/// # Errors
/// Returns an error if the log directory cannot be created, the filter is
/// invalid, or a global subscriber is already installed.
pub fn init(default_level: &str) -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(directive.trim())
            .with_context(|| format!("Invalid {LOG_ENV} filter"))?,
        _ => EnvFilter::try_new(default_level)
            .with_context(|| format!("Invalid log_level \"{default_level}\""))?,
    };

    let file_appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging initialized");
    Ok(guard)
}
