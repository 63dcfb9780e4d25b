use anyhow::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "tasknag.log";

/// Build the filter: `RUST_LOG` wins over the configured level
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("tasknag={level}")))
        .unwrap_or_else(|_| EnvFilter::new("tasknag=info"))
}

/// Route tracing output to `<state_dir>/tasknag.log`.
///
/// The terminal belongs to the TUI, so nothing is written to stdout or
/// stderr. Keep the returned guard alive until exit or buffered lines
/// are lost.
pub fn init(state_dir: &Path, level: &str) -> Result<WorkerGuard> {
    let appender = tracing_appender::rolling::never(state_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to install logger: {}", err))?;

    Ok(guard)
}
