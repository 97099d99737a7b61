//! Structured logging
//!
//! Human-readable output on stderr, plus an optional daily-rolling
//! NDJSON file. `RUST_LOG` wins over the configured level.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name prefix of rolled log files
pub const LOG_FILE_PREFIX: &str = "receipt-scanner.log";

/// Daily appender under `dir`. Creates the directory if needed.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
        .with_context(|| format!("Cannot write logs to {}", dir.display()))
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber.
///
/// Fails only when `log_dir` is unusable. A subscriber that is already
/// installed is left in place.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<()> {
    let file_layer = log_dir
        .map(file_appender)
        .transpose()?
        .map(|appender| fmt::layer().json().with_writer(appender).with_ansi(false));

    // stdout is reserved for command output
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if tracing_subscriber::registry()
        .with(level_filter(level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("subscriber already installed");
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
