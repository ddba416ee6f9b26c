//! Agent runtime backed by the `claude` command-line agent.
//!
//! The CLI runs one non-interactive task per process:
//!
//! ```sh
//! claude -p "<prompt>" --output-format stream-json --verbose \
//!     --model <model> --allowedTools WebFetch,Read,Write \
//!     --permission-mode acceptEdits --setting-sources project [--resume <id>]
//! ```
//!
//! Stdout carries one JSON message per line and is turned into a
//! [`MessageStream`]. Stderr is diagnostic only and goes to `debug!`.
//! When stdout closes the child is reaped; a non-zero exit status becomes the
//! stream's final [`AgentError::Exit`] item.

use super::{AgentError, AgentMessage, AgentRuntime, AgentTask, MessageStream};
use crate::utils::truncate_for_log;
use futures::StreamExt;
use futures::stream;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info, instrument, warn};

/// Spawns the agent CLI for each task.
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    program: PathBuf,
}

impl ClaudeCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments for `task`.
    pub fn args(task: &AgentTask) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            task.prompt.clone(),
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
            "--model".to_string(),
            task.model.clone(),
            "--allowedTools".to_string(),
            task.allowed_tools.join(","),
            "--permission-mode".to_string(),
            task.permission_mode.clone(),
            "--setting-sources".to_string(),
            task.setting_sources.clone(),
        ];
        if let Some(session_id) = &task.resume {
            args.push("--resume".to_string());
            args.push(session_id.clone());
        }
        args
    }
}

struct StreamState {
    lines: Lines<BufReader<ChildStdout>>,
    /// `None` once the child has been reaped and the stream is finished.
    child: Option<Child>,
}

impl AgentRuntime for ClaudeCli {
    #[instrument(level = "info", skip_all, fields(program = %self.program.display(), model = %task.model))]
    async fn query(&self, task: &AgentTask) -> Result<MessageStream, AgentError> {
        let mut child = Command::new(&self.program)
            .args(Self::args(task))
            .current_dir(&task.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AgentError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        info!(pid = ?child.id(), "Agent process started");

        let stdout = child.stdout.take().ok_or_else(|| {
            AgentError::Io(std::io::Error::other("agent stdout unavailable after spawn"))
        })?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "ai_pulse::agent::stderr", "{}", line);
                }
            });
        }

        let state = StreamState {
            lines: BufReader::new(stdout).lines(),
            child: Some(child),
        };

        Ok(stream::unfold(state, next_message).boxed())
    }
}

async fn next_message(
    mut state: StreamState,
) -> Option<(Result<AgentMessage, AgentError>, StreamState)> {
    loop {
        let child = state.child.as_mut()?;
        match state.lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match AgentMessage::from_line(&line) {
                    Ok(message) => return Some((Ok(message), state)),
                    Err(e) => {
                        warn!(
                            error = %e,
                            line = %truncate_for_log(&line, 200),
                            "Skipping unparseable agent output"
                        );
                    }
                }
            }
            Ok(None) => {
                let status = child.wait().await;
                state.child = None;
                return match status {
                    Ok(status) if status.success() => {
                        debug!("Agent process exited cleanly");
                        None
                    }
                    Ok(status) => Some((Err(AgentError::Exit(status.code())), state)),
                    Err(e) => Some((Err(AgentError::Io(e)), state)),
                };
            }
            Err(e) => {
                let _ = child.start_kill();
                state.child = None;
                return Some((Err(AgentError::Io(e)), state));
            }
        }
    }
}
