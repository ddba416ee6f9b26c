//! The collection run: one agent task, streamed to the log, with session
//! bookkeeping on either side.
//!
//! # Run sequence
//!
//! 1. Load the allowlist and the current snapshot (for logging and auditing)
//! 2. Load the previous session pointer, if any
//! 3. Start the agent with the collection task, resuming the session
//! 4. Stream agent output to the log, capturing the new session id
//! 5. Save the session id
//! 6. Re-read the snapshot, log how many articles were added and any
//!    integrity problems
//!
//! Steps 1, 2, 5 and 6 never fail the run. Anything that goes wrong in
//! steps 3 and 4 does.

use crate::agent::{AgentError, AgentMessage, AgentRuntime, AgentTask, ContentBlock};
use crate::config::{CollectorSettings, load_whitelist};
use crate::models::{NewsSnapshot, Whitelist};
use crate::session::SessionBookkeeper;
use crate::snapshot::{known_urls, read_snapshot_or_empty, validate};
use crate::utils::truncate_for_log;
use futures::StreamExt;
use tracing::{debug, info, instrument, warn};

/// What a collection run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionReport {
    /// Session the run resumed, if any.
    pub resumed: Option<String>,
    /// Session id reported by the agent's `init` message.
    pub session_id: Option<String>,
    /// Completion subtype from the agent's `result` message.
    pub outcome: Option<String>,
    pub tool_calls: usize,
    pub articles_before: usize,
    pub articles_after: usize,
    /// Articles whose URL was not in the snapshot before the run.
    pub articles_added: usize,
    pub issues: usize,
}

/// Logs agent messages and records what the collector needs from them.
#[derive(Debug, Default)]
pub struct StreamObserver {
    pub session_id: Option<String>,
    pub outcome: Option<String>,
    pub tool_calls: usize,
}

impl StreamObserver {
    pub fn observe(&mut self, message: &AgentMessage) {
        if let Some(id) = message.init_session_id() {
            if self.session_id.is_none() {
                info!(session_id = %id, "Agent session started");
                self.session_id = Some(id.to_string());
            } else {
                debug!(session_id = %id, "Ignoring repeated init message");
            }
            return;
        }

        match message {
            AgentMessage::Assistant { message } => {
                for block in &message.content {
                    match block {
                        ContentBlock::Text { text } => {
                            info!(target: "ai_pulse::agent", "{}", truncate_for_log(text, 2000))
                        }
                        ContentBlock::ToolUse { name } => {
                            self.tool_calls += 1;
                            info!(tool = %name, "Tool: {}", name);
                        }
                        ContentBlock::Other => {}
                    }
                }
            }
            AgentMessage::Result {
                subtype,
                is_error,
                num_turns,
                duration_ms,
                total_cost_usd,
            } => {
                if *is_error || subtype != "success" {
                    warn!(%subtype, ?num_turns, ?duration_ms, ?total_cost_usd, "Agent finished with errors");
                } else {
                    info!(%subtype, ?num_turns, ?duration_ms, ?total_cost_usd, "Agent finished");
                }
                self.outcome = Some(subtype.clone());
            }
            AgentMessage::System { subtype, .. } => debug!(%subtype, "Agent system message"),
            AgentMessage::Other => {}
        }
    }
}

/// Run one collection through `runtime`.
///
/// # Errors
///
/// Returns the agent error if the runtime cannot be started, the stream
/// fails, or the agent exits unsuccessfully. The session pointer is not
/// updated in that case.
#[instrument(level = "info", skip_all, fields(model = %settings.model))]
pub async fn run_collection<R: AgentRuntime>(
    runtime: &R,
    settings: &CollectorSettings,
) -> Result<CollectionReport, AgentError> {
    let snapshot_path = settings.resolve(&settings.snapshot_path());
    let bookkeeper = SessionBookkeeper::in_dir(&settings.resolve(&settings.data_dir));

    let whitelist = match load_whitelist(&settings.resolve(&settings.whitelist_path())).await {
        Ok(wl) => Some(wl),
        Err(e) => {
            warn!(error = %e, "Allowlist unavailable; the agent will report its own failure");
            None
        }
    };

    let before = read_or_warn(&snapshot_path).await;
    let articles_before = before.as_ref().map_or(0, |s| s.news.len());
    info!(articles = articles_before, "Snapshot before collection");

    let previous = bookkeeper.load().await;
    let resumed = previous.map(|p| p.session_id);
    match &resumed {
        Some(id) => info!(session_id = %id, "Resuming session"),
        None => info!("Starting a new session"),
    }

    let task = AgentTask::collection(settings, resumed.clone());
    let mut stream = runtime.query(&task).await?;

    let mut observer = StreamObserver::default();
    while let Some(message) = stream.next().await {
        observer.observe(&message?);
    }

    match &observer.session_id {
        Some(id) => bookkeeper.save(id).await,
        None => warn!("Agent reported no session id; session pointer left unchanged"),
    }

    let mut report = CollectionReport {
        resumed,
        session_id: observer.session_id,
        outcome: observer.outcome,
        tool_calls: observer.tool_calls,
        articles_before,
        ..Default::default()
    };

    if let Some(after) = read_or_warn(&snapshot_path).await {
        audit(&mut report, before.as_ref(), &after, whitelist.as_ref());
    }

    info!(
        tool_calls = report.tool_calls,
        before = report.articles_before,
        after = report.articles_after,
        added = report.articles_added,
        issues = report.issues,
        "Collection complete"
    );
    Ok(report)
}

async fn read_or_warn(path: &std::path::Path) -> Option<NewsSnapshot> {
    match read_snapshot_or_empty(path).await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Snapshot unreadable");
            None
        }
    }
}

fn audit(
    report: &mut CollectionReport,
    before: Option<&NewsSnapshot>,
    after: &NewsSnapshot,
    whitelist: Option<&Whitelist>,
) {
    let known = before.map(known_urls).unwrap_or_default();
    report.articles_after = after.news.len();
    report.articles_added = after
        .news
        .iter()
        .filter(|a| !known.contains(a.url.as_str()))
        .count();

    if report.articles_after < report.articles_before {
        warn!(
            before = report.articles_before,
            after = report.articles_after,
            "Snapshot shrank during collection"
        );
    }

    let issues = validate(after, whitelist);
    for issue in &issues {
        warn!(%issue, "Snapshot integrity problem");
    }
    report.issues = issues.len();
}
