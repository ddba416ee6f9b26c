//! The external agent runtime the collector delegates to.
//!
//! # Architecture
//!
//! - [`AgentTask`]: Everything the runtime is told for one run
//! - [`AgentRuntime`]: Trait seam over the runtime; yields a stream of [`AgentMessage`]s
//! - [`claude_cli::ClaudeCli`]: Production runtime that spawns the agent CLI
//! - [`messages`]: The stream's message shapes
//! - [`prompt`]: The task description

pub mod claude_cli;
pub mod messages;
pub mod prompt;

use crate::config::CollectorSettings;
use futures::stream::BoxStream;
use prompt::{PromptContext, collection_prompt};
use std::path::PathBuf;
use thiserror::Error;

pub use messages::{AgentMessage, ContentBlock};

/// Tools the agent may use. Nothing else is granted.
pub const ALLOWED_TOOLS: [&str; 3] = ["WebFetch", "Read", "Write"];

/// Permission mode: file edits are accepted without prompting.
pub const PERMISSION_MODE: &str = "acceptEdits";

/// Only project-level agent settings are honoured.
pub const SETTING_SOURCES: &str = "project";

/// Errors that end a collection run.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to start agent `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("agent stream read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("agent exited with status {}", .0.map_or("signal".to_string(), |c| c.to_string()))]
    Exit(Option<i32>),
}

/// Stream of runtime messages for one run.
pub type MessageStream = BoxStream<'static, Result<AgentMessage, AgentError>>;

/// One run's instructions for the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTask {
    pub prompt: String,
    pub allowed_tools: Vec<String>,
    pub working_dir: PathBuf,
    pub model: String,
    pub permission_mode: String,
    pub setting_sources: String,
    /// Session to resume, when a previous run left one.
    pub resume: Option<String>,
}

impl AgentTask {
    /// Build the collection task for `settings`, resuming `resume` if given.
    pub fn collection(settings: &CollectorSettings, resume: Option<String>) -> Self {
        let whitelist_path = settings.whitelist_path();
        let snapshot_path = settings.snapshot_path();
        let prompt = collection_prompt(&PromptContext {
            whitelist_path: &whitelist_path,
            snapshot_path: &snapshot_path,
            summary_language: &settings.summary_language,
            resuming: resume.is_some(),
        });

        Self {
            prompt,
            allowed_tools: ALLOWED_TOOLS.iter().map(|t| t.to_string()).collect(),
            working_dir: settings.working_dir.clone(),
            model: settings.model.clone(),
            permission_mode: PERMISSION_MODE.to_string(),
            setting_sources: SETTING_SOURCES.to_string(),
            resume,
        }
    }
}

/// Something that can run an [`AgentTask`] and stream back its messages.
pub trait AgentRuntime {
    /// Start the task. The returned stream ends when the runtime finishes;
    /// an `Err` item ends the run.
    async fn query(&self, task: &AgentTask) -> Result<MessageStream, AgentError>;
}
