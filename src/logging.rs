//! File logging for the terminal UI.
//!
//! The TUI owns stdout, so diagnostics go to `sizing_terminal.log` inside the
//! configured log directory. `RUST_LOG` overrides the default `info` filter.
//! User-facing messages still go through the in-app console (`AppState::logs`).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "sizing_terminal.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Returns a guard that must live until exit so buffered lines are flushed.
/// Returns `None` when the directory cannot be created; logging is then off.
pub fn init_file(log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(err) = std::fs::create_dir_all(log_dir) {
        eprintln!("failed to create log directory {}: {err}", log_dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(env_filter())
        .try_init();

    tracing::info!(log_file = %log_dir.join(LOG_FILE).display(), "logging initialized");
    Some(guard)
}

/// Stderr-only logging for the headless binaries.
pub fn init_stderr() {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(env_filter())
        .try_init();
}
