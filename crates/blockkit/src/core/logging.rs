//! Logging Setup
//!
//! Installs the global `tracing` subscriber: an `EnvFilter`, a stdout layer
//! and an optional daily-rolling file layer.

use std::path::Path;
use std::sync::OnceLock;

use tracing_subscriber::prelude::*;

/// Log file name prefix inside the log directory
pub const LOG_FILE_NAME: &str = "blockkit.log";

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Builds the filter: `RUST_LOG` wins, otherwise `default_level`
fn env_filter(default_level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
}

/// Initializes logging.
///
/// Safe to call more than once; only the first call installs a subscriber.
/// Returns `true` if this call installed it.
pub fn init_logging(default_level: &str, log_dir: Option<&Path>) -> bool {
    let file_layer = log_dir.and_then(|dir| {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Failed to create log directory {:?}: {}", dir, e);
            return None;
        }
        if LOG_GUARD.get().is_some() {
            return None;
        }

        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
    });

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stdout_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber).is_ok()
}
