use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "timelog.log";
const LOG_RETENTION_DAYS: u64 = 7;

/// Return the log directory path.
///
/// Precedence: `TIMELOG_LOG_DIR` env var > settings override > platform data dir.
pub fn log_dir(configured: Option<&Path>) -> PathBuf {
    if let Ok(dir) = std::env::var("TIMELOG_LOG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    dirs::data_dir()
        .map(|data| data.join("timelog").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Default filter directive for the given debug flag
fn default_directive(debug: bool) -> &'static str {
    if debug {
        "timelog=debug"
    } else {
        "timelog=info"
    }
}

/// Remove rolled log files older than `max_age_days`.
/// Only touches files starting with the timelog prefix.
fn cleanup_old_logs(log_path: &Path, max_age_days: u64) {
    let cutoff =
        std::time::SystemTime::now() - std::time::Duration::from_secs(max_age_days * 86400);
    let Ok(entries) = std::fs::read_dir(log_path) else {
        return;
    };
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let stale = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .is_ok_and(|modified| modified < cutoff);
        if stale {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

/// Initialize file logging. Keep the returned guard alive until exit so
/// buffered lines are flushed.
///
/// Filter comes from `TIMELOG_LOG` or `RUST_LOG`, falling back to info
/// (debug when `debug` is set). Output goes to a daily rolling file only,
/// never the terminal the view draws on.
pub fn init(debug: bool, configured_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env("TIMELOG_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let log_path = log_dir(configured_dir);
    if let Err(e) = std::fs::create_dir_all(&log_path) {
        eprintln!("warning: failed to create log directory {:?}: {}", log_path, e);
        return None;
    }
    cleanup_old_logs(&log_path, LOG_RETENTION_DAYS);

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&log_path, LOG_FILE_PREFIX));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok()?;

    Some(guard)
}
