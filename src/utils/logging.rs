//! Diagnostic logging through `tracing`.
//!
//! The interactive UI owns the terminal, so its events go to `ponder.log` in
//! the data directory. One-shot commands log to stderr. Both honor
//! `PONDER_LOG` as an env-filter directive and default to `warn`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "PONDER_LOG";
pub const LOG_FILE_NAME: &str = "ponder.log";
const DEFAULT_DIRECTIVE: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

pub fn init_stderr_logging() {
    // A global subscriber may already be installed (tests); keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Append log output to `<dir>/ponder.log` and return the file path.
pub fn init_file_logging(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(path)
}
