//! Command-line interface definitions for AI Pulse.
//!
//! Every option has a default and an environment variable, so the scheduled
//! collector runs as a bare `ai_pulse collect`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default model handed to the agent runtime.
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

/// Command-line arguments for AI Pulse.
///
/// # Examples
///
/// ```sh
/// # Scheduled collection run
/// ai_pulse collect
///
/// # Browse the local snapshot
/// ai_pulse read
///
/// # Browse a deployed snapshot
/// ai_pulse read --source https://example.github.io/ai-pulse/
///
/// # Audit the snapshot against the allowlist
/// ai_pulse check
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the news-collecting agent once and record its session
    Collect(CollectArgs),
    /// Browse the news snapshot in the terminal
    Read(ReadArgs),
    /// Check the snapshot for duplicate, malformed, or unlisted articles
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    /// Directory holding current.json and session.json
    #[arg(long, env = "AI_PULSE_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory holding whitelist.json
    #[arg(long, env = "AI_PULSE_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    /// Model identifier passed to the agent runtime
    #[arg(long, env = "AI_PULSE_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Agent runtime executable
    #[arg(long, env = "AI_PULSE_AGENT_BIN", default_value = "claude")]
    pub agent_bin: PathBuf,

    /// Language the article summaries are written in
    #[arg(long, env = "AI_PULSE_SUMMARY_LANGUAGE", default_value = "Japanese")]
    pub summary_language: String,
}

#[derive(Args, Debug, Clone)]
pub struct ReadArgs {
    /// Base URL of the deployed site, or a local snapshot file or directory
    #[arg(long, env = "AI_PULSE_SOURCE", default_value = ".")]
    pub source: String,

    /// File the reader writes its logs to
    #[arg(long, env = "AI_PULSE_LOG_FILE", default_value = "ai_pulse.log")]
    pub log_file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Snapshot file to check
    #[arg(long, env = "AI_PULSE_SNAPSHOT", default_value = "data/current.json")]
    pub snapshot: PathBuf,

    /// Allowlist to check sources against
    #[arg(long, env = "AI_PULSE_WHITELIST", default_value = "config/whitelist.json")]
    pub whitelist: PathBuf,
}
