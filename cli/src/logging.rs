//! Logging for the bynder CLI
//!
//! Logs go to bynder.log in the platform log directory so stdout stays clean
//! for command output. `--tracing` sends them to stderr instead.

use config::PathManager;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "info,bynder_core=debug";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole run.
pub fn init_logging(to_stderr: bool) -> Option<WorkerGuard> {
    if to_stderr {
        init_stderr_logging();
        return None;
    }

    let Some(path) = PathManager::log_file_path() else {
        init_stderr_logging();
        return None;
    };

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("[bynder] Failed to create log directory {:?}: {}", parent, e);
        }
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path);

    match file {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);

            let subscriber = tracing_subscriber::registry().with(filter()).with(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            );

            if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
                eprintln!("[bynder] Failed to set tracing subscriber: {}", e);
            }
            Some(guard)
        }
        Err(e) => {
            eprintln!("[bynder] Failed to open log file {:?}: {}", path, e);
            init_stderr_logging();
            None
        }
    }
}

fn init_stderr_logging() {
    let subscriber = tracing_subscriber::registry().with(filter()).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true),
    );

    let _ = tracing::subscriber::set_global_default(subscriber);
}
