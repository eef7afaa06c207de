//! CLI command implementations

pub mod accounts;
pub mod auth;
pub mod categories;
pub mod config;
pub mod link;
pub mod logs;
pub mod request;
pub mod status;
pub mod transactions;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use fintrack_core::services::{EventLog, LogEvent, Source};
use fintrack_core::FintrackContext;

/// Shared handle to the event log; `None` when it could not be opened
pub type Logger = Option<Arc<EventLog>>;

/// Open the event log for this run
///
/// Returns None if it cannot be opened; commands still run without it
pub fn get_logger() -> Logger {
    let fintrack_dir = get_fintrack_dir().ok()?;
    std::fs::create_dir_all(&fintrack_dir).ok()?;
    EventLog::open(&fintrack_dir, Source::Cli, env!("CARGO_PKG_VERSION"))
        .ok()
        .map(Arc::new)
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Logger, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.record(&event);
    }
}

/// Get the FinTrack directory from environment or default
pub fn get_fintrack_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FINTRACK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".fintrack"))
        .context("Could not find home directory; set FINTRACK_DIR")
}

/// Build the FinTrack context, with API events going to `logger`
pub fn get_context(logger: &Logger) -> Result<FintrackContext> {
    let fintrack_dir = get_fintrack_dir()?;

    std::fs::create_dir_all(&fintrack_dir)
        .with_context(|| format!("Failed to create FinTrack directory: {:?}", fintrack_dir))?;

    FintrackContext::open(&fintrack_dir, logger.clone())
        .context("Failed to initialize FinTrack context")
}
