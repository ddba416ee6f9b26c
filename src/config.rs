//! Collector configuration: the source allowlist and run settings.

use crate::cli::CollectArgs;
use crate::models::Whitelist;
use crate::snapshot::SNAPSHOT_FILE;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// File name of the allowlist inside the config directory.
pub const WHITELIST_FILE: &str = "whitelist.json";

/// Everything the collector needs for one run, resolved from the CLI.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    /// Agent working directory; the paths below are relative to it in the prompt.
    pub working_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config_dir: PathBuf,
    pub model: String,
    pub agent_bin: PathBuf,
    pub summary_language: String,
}

impl CollectorSettings {
    /// Resolve settings against the process working directory.
    pub fn from_args(args: &CollectArgs) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            working_dir: std::env::current_dir()?,
            data_dir: args.data_dir.clone(),
            config_dir: args.config_dir.clone(),
            model: args.model.clone(),
            agent_bin: args.agent_bin.clone(),
            summary_language: args.summary_language.clone(),
        })
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    pub fn whitelist_path(&self) -> PathBuf {
        self.config_dir.join(WHITELIST_FILE)
    }

    /// Resolve `path` against the working directory unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

/// Load and parse the allowlist.
///
/// An allowlist with no sources is returned as-is but logged, since the agent
/// will have nothing to collect.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_whitelist(path: &Path) -> Result<Whitelist, Box<dyn Error>> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| format!("reading allowlist {}: {e}", path.display()))?;
    let whitelist: Whitelist = serde_json::from_str(&raw)
        .map_err(|e| format!("parsing allowlist {}: {e}", path.display()))?;

    if whitelist.sources.is_empty() {
        warn!("Allowlist has no sources");
    } else {
        info!(sources = whitelist.sources.len(), "Loaded allowlist");
    }
    Ok(whitelist)
}
