//! Reading and auditing the news snapshot.
//!
//! The snapshot (`data/current.json`) is written by the agent and read by the
//! reader. This module reads it from disk and checks the invariants the rest
//! of the system relies on:
//!
//! | Invariant | Issue reported |
//! |-----------|----------------|
//! | `id` unique | [`SnapshotIssue::DuplicateId`] |
//! | `url` unique | [`SnapshotIssue::DuplicateUrl`] |
//! | `id` is `YYYYMMDD-NNN` | [`SnapshotIssue::MalformedId`] |
//! | `url` is an absolute http(s) URL | [`SnapshotIssue::InvalidUrl`] |
//! | timestamps are ISO 8601 | [`SnapshotIssue::UnparseableTimestamp`] |
//! | source is allowlisted | [`SnapshotIssue::UnlistedSource`] |
//!
//! Category and importance values are enforced earlier, by typed
//! deserialization.

use crate::models::{NewsSnapshot, Whitelist, parse_timestamp};
use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Path of the snapshot relative to the deployment root.
pub const SNAPSHOT_PATH: &str = "data/current.json";

/// File name of the snapshot inside the data directory.
pub const SNAPSHOT_FILE: &str = "current.json";

static ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{8})-\d{3}$").unwrap());

/// A single invariant violation found in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotIssue {
    DuplicateId(String),
    DuplicateUrl(String),
    MalformedId(String),
    InvalidUrl { id: String, url: String },
    UnparseableTimestamp { field: &'static str, id: Option<String>, value: String },
    UnlistedSource { id: String, source_name: String },
}

impl fmt::Display for SnapshotIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotIssue::DuplicateId(id) => write!(f, "duplicate id {id}"),
            SnapshotIssue::DuplicateUrl(url) => write!(f, "duplicate url {url}"),
            SnapshotIssue::MalformedId(id) => write!(f, "id {id:?} is not YYYYMMDD-NNN"),
            SnapshotIssue::InvalidUrl { id, url } => {
                write!(f, "article {id} has invalid url {url:?}")
            }
            SnapshotIssue::UnparseableTimestamp { field, id: Some(id), value } => {
                write!(f, "article {id} has unparseable {field} {value:?}")
            }
            SnapshotIssue::UnparseableTimestamp { field, id: None, value } => {
                write!(f, "snapshot has unparseable {field} {value:?}")
            }
            SnapshotIssue::UnlistedSource { id, source_name } => {
                write!(f, "article {id} comes from unlisted source {source_name:?}")
            }
        }
    }
}

/// Read and parse a snapshot file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_snapshot(path: &Path) -> Result<NewsSnapshot, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    let snapshot: NewsSnapshot = serde_json::from_str(&raw)?;
    debug!(articles = snapshot.news.len(), "Parsed snapshot");
    Ok(snapshot)
}

/// Read a snapshot if one exists, treating a missing file as an empty one.
pub async fn read_snapshot_or_empty(path: &Path) -> Result<NewsSnapshot, Box<dyn Error>> {
    if fs::try_exists(path).await? {
        read_snapshot(path).await
    } else {
        Ok(NewsSnapshot {
            last_updated: String::new(),
            news: Vec::new(),
        })
    }
}

/// Set of article URLs already present in a snapshot.
pub fn known_urls(snapshot: &NewsSnapshot) -> HashSet<&str> {
    snapshot.news.iter().map(|a| a.url.as_str()).collect()
}

/// Whether `id` is `YYYYMMDD-NNN` with a real calendar date.
pub fn is_valid_id(id: &str) -> bool {
    ID_PATTERN
        .captures(id)
        .and_then(|c| c.get(1))
        .is_some_and(|date| NaiveDate::parse_from_str(date.as_str(), "%Y%m%d").is_ok())
}

fn is_absolute_http_url(raw: &str) -> bool {
    url::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Check a snapshot against its invariants.
///
/// Source allowlisting is only checked when `whitelist` is given. An empty
/// result means the snapshot is sound.
pub fn validate(snapshot: &NewsSnapshot, whitelist: Option<&Whitelist>) -> Vec<SnapshotIssue> {
    let mut issues = Vec::new();

    if !snapshot.last_updated.is_empty()
        && parse_timestamp(&snapshot.last_updated).is_none()
    {
        issues.push(SnapshotIssue::UnparseableTimestamp {
            field: "lastUpdated",
            id: None,
            value: snapshot.last_updated.clone(),
        });
    }

    issues.extend(
        snapshot
            .news
            .iter()
            .map(|a| a.id.as_str())
            .duplicates()
            .map(|id| SnapshotIssue::DuplicateId(id.to_string())),
    );
    issues.extend(
        snapshot
            .news
            .iter()
            .map(|a| a.url.as_str())
            .duplicates()
            .map(|url| SnapshotIssue::DuplicateUrl(url.to_string())),
    );

    for article in &snapshot.news {
        if !is_valid_id(&article.id) {
            issues.push(SnapshotIssue::MalformedId(article.id.clone()));
        }
        if !is_absolute_http_url(&article.url) {
            issues.push(SnapshotIssue::InvalidUrl {
                id: article.id.clone(),
                url: article.url.clone(),
            });
        }
        if parse_timestamp(&article.published_at).is_none() {
            issues.push(SnapshotIssue::UnparseableTimestamp {
                field: "publishedAt",
                id: Some(article.id.clone()),
                value: article.published_at.clone(),
            });
        }
        if let Some(wl) = whitelist {
            if !wl.admits(article) {
                issues.push(SnapshotIssue::UnlistedSource {
                    id: article.id.clone(),
                    source_name: article.source_name.clone(),
                });
            }
        }
    }

    issues
}
