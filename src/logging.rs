//! Tracing setup: stderr always, plus the master log file for suite runs

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::MASTER_LOG_FILE;
use crate::error::{BenchError, Result};

/// `RUST_LOG` wins; otherwise `info`, or `debug` when verbose
fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to stderr only
pub fn init_stderr(verbose: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| BenchError::ConfigError(format!("Failed to initialise logging: {}", e)))
}

/// Log to stderr and append to `{output_dir}/master_runner.log`.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the whole run.
pub fn init_with_master_log(output_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    fs::create_dir_all(output_dir)?;
    let file_appender = tracing_appender::rolling::never(output_dir, MASTER_LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| BenchError::ConfigError(format!("Failed to initialise logging: {}", e)))?;

    Ok(guard)
}
