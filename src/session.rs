//! Session bookkeeping for the collector.
//!
//! The agent runtime can resume a previous conversation when handed its
//! session identifier. The collector keeps that identifier in
//! `data/session.json` between runs:
//!
//! ```json
//! { "sessionId": "…", "lastRun": "2024-01-01T00:00:00.000Z" }
//! ```
//!
//! Neither reading nor writing this file may fail a collection run. A missing
//! or corrupt file reads as "no prior session"; a failed write is logged.

use crate::models::SessionPointer;
use crate::utils::now_rfc3339;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// File name of the session pointer inside the data directory.
pub const SESSION_FILE: &str = "session.json";

/// Reads and writes the [`SessionPointer`] file.
#[derive(Debug, Clone)]
pub struct SessionBookkeeper {
    path: PathBuf,
}

impl SessionBookkeeper {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Bookkeeper for `<data_dir>/session.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_FILE))
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous session pointer.
    ///
    /// Returns `None` on the first run (no file) and when the file cannot be
    /// read or parsed; the latter is logged as a warning.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> Option<SessionPointer> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No previous session file");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read session file; starting fresh");
                return None;
            }
        };

        match serde_json::from_str::<SessionPointer>(&raw) {
            Ok(pointer) if pointer.session_id.trim().is_empty() => {
                warn!("Session file has an empty sessionId; starting fresh");
                None
            }
            Ok(pointer) => {
                info!(session_id = %pointer.session_id, last_run = %pointer.last_run, "Loaded previous session");
                Some(pointer)
            }
            Err(e) => {
                warn!(error = %e, "Session file is corrupt; starting fresh");
                None
            }
        }
    }

    /// Persist `session_id` with the current time as `lastRun`.
    ///
    /// The file is overwritten whole. Errors are logged and swallowed.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), %session_id))]
    pub async fn save(&self, session_id: &str) {
        let pointer = SessionPointer {
            session_id: session_id.to_string(),
            last_run: now_rfc3339(),
        };

        let json = match serde_json::to_string_pretty(&pointer) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize session pointer");
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                warn!(error = %e, "Failed to create session directory");
                return;
            }
        }

        match fs::write(&self.path, json).await {
            Ok(()) => info!("Saved session pointer"),
            Err(e) => warn!(error = %e, "Failed to write session file"),
        }
    }
}
