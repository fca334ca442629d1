//! Tracing setup
//!
//! The terminal belongs to the UI, so logs go to a file through a
//! non-blocking writer. Filter comes from `CHATOPS_LOG`, then `RUST_LOG`,
//! then `chatops_console=info`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE: &str = "chatops-console.log";
pub const FILTER_ENV: &str = "CHATOPS_LOG";
const DEFAULT_FILTER: &str = "chatops_console=info";

/// Build the env filter from the environment
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to `<dir>/chatops-console.log`.
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes pending lines.
pub fn init(dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()?;

    tracing::info!(path = %dir.join(LOG_FILE).display(), "logging initialised");
    Ok(guard)
}
