use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name looked up by [`discover_data_path`].
pub const DATA_FILE_NAME: &str = "kika-incidents.csv";

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name to an [`EnvFilter`] directive.
fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" | "CRITICAL" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Logs go to stderr so stdout carries only the JSON view output. Falls back
/// to `"info"` if the level string is not recognised.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()?;

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Candidate locations of the incident CSV, in lookup order:
/// 1. `<cwd>/data/kika-incidents.csv`
/// 2. `~/.kika-dashboard/kika-incidents.csv`
fn candidates(cwd: &Path, home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join("data").join(DATA_FILE_NAME)];
    if let Some(home) = home {
        paths.push(home.join(".kika-dashboard").join(DATA_FILE_NAME));
    }
    paths
}

/// Locate the incident CSV when `--data` is not given.
///
/// Returns `None` when no candidate exists.
pub fn discover_data_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    candidates(&cwd, dirs::home_dir())
        .into_iter()
        .find(|p| p.is_file())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
