//! Data models shared by the collector and the reader.
//!
//! This module defines the snapshot contract and the collector's private state:
//! - [`NewsArticle`]: A single classified and summarized article
//! - [`NewsSnapshot`]: The whole `data/current.json` document
//! - [`Whitelist`] / [`SourceEntry`]: The allowlist of permitted sources
//! - [`SessionPointer`]: The persisted agent session token
//!
//! Field names are camelCase on the wire to match the JSON files the agent
//! reads and writes, so every struct carries `#[serde(rename_all = "camelCase")]`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parse an ISO-8601 timestamp as written by the agent.
///
/// Accepts RFC 3339 (`2024-01-05T10:00:00Z`, `…+09:00`), a date-time without
/// an offset (`2024-01-05T10:00:00`, `2024-01-05T10:00`), and a bare date
/// (`2024-01-05`). Forms without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Some(naive.and_utc().fixed_offset())
}

/// The topical bucket an article is classified into.
///
/// - `Model`: LLMs, foundation models, training techniques
/// - `Service`: APIs, products, services
/// - `Other`: everything else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Category {
    Model,
    Service,
    Other,
}

impl Category {
    /// All categories in display order.
    #[cfg(test)]
    pub const ALL: [Category; 3] = [Category::Model, Category::Service, Category::Other];

    /// Upper-case badge label used on cards and in the detail view.
    pub fn label(self) -> &'static str {
        match self {
            Category::Model => "MODEL",
            Category::Service => "SERVICE",
            Category::Other => "OTHER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Model => "Model",
            Category::Service => "Service",
            Category::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Two-level priority tag driving display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Normal,
}

/// The category filter selected in the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Filters in tab order: All, Model, Service, Other.
    pub const TABS: [CategoryFilter; 4] = [
        CategoryFilter::All,
        CategoryFilter::Only(Category::Model),
        CategoryFilter::Only(Category::Service),
        CategoryFilter::Only(Category::Other),
    ];

    /// Whether an article in `category` passes this filter.
    pub fn admits(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }

    /// Tab label.
    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(Category::Model) => "Model",
            CategoryFilter::Only(Category::Service) => "Service",
            CategoryFilter::Only(Category::Other) => "Other",
        }
    }

    /// The next tab, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::TABS.iter().position(|f| *f == self).unwrap_or(0);
        Self::TABS[(i + 1) % Self::TABS.len()]
    }

    /// The previous tab, wrapping around.
    pub fn prev(self) -> Self {
        let i = Self::TABS.iter().position(|f| *f == self).unwrap_or(0);
        Self::TABS[(i + Self::TABS.len() - 1) % Self::TABS.len()]
    }
}

/// A news article as written into the snapshot by the agent.
///
/// # JSON Schema
///
/// ```json
/// {
///   "id": "20240101-001",
///   "title": "...",
///   "url": "https://...",
///   "sourceName": "...",
///   "category": "Model",
///   "publishedAt": "2024-01-01T00:00:00Z",
///   "summary": "...",
///   "importance": "high"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    /// Identifier in `YYYYMMDD-NNN` form, unique within a snapshot.
    pub id: String,
    /// Article headline.
    pub title: String,
    /// Absolute article URL; doubles as the dedup key.
    pub url: String,
    /// Name of the allowlisted source the article came from.
    pub source_name: String,
    pub category: Category,
    /// ISO-8601 publication timestamp.
    pub published_at: String,
    /// Short summary (about 100 characters) in the audience language.
    pub summary: String,
    pub importance: Importance,
}

impl NewsArticle {
    /// Host part of the article URL, if it parses.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
    }

    /// Parsed `publishedAt`, if it is a timestamp [`parse_timestamp`] accepts.
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.published_at)
    }

    pub fn is_high(&self) -> bool {
        self.importance == Importance::High
    }
}

/// The `data/current.json` document.
///
/// The order of `news` carries no meaning; the reader always recomputes
/// display order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSnapshot {
    /// ISO-8601 timestamp of the last collector update.
    pub last_updated: String,
    pub news: Vec<NewsArticle>,
}

/// One permitted source origin.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntry {
    pub url: String,
    pub source_name: String,
}

impl SourceEntry {
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
    }
}

/// The `config/whitelist.json` document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Whitelist {
    pub sources: Vec<SourceEntry>,
}

impl Whitelist {
    /// Whether an article plausibly originates from an allowlisted source.
    ///
    /// An article is accepted when its URL host equals (or is a subdomain of)
    /// the host of any entry, or when its `sourceName` matches an entry name.
    pub fn admits(&self, article: &NewsArticle) -> bool {
        let host = article.host();
        self.sources.iter().any(|s| {
            let host_match = match (&host, s.host()) {
                (Some(a), Some(b)) => *a == b || a.ends_with(&format!(".{b}")),
                _ => false,
            };
            host_match || s.source_name == article.source_name
        })
    }
}

/// The collector's `data/session.json` document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPointer {
    /// Opaque token understood by the agent runtime.
    pub session_id: String,
    /// ISO-8601 timestamp of the run that produced the token.
    pub last_run: String,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_deserialization() {
        let json = r#"{
            "lastUpdated": "2024-01-01T00:00:00Z",
            "news": [{
                "id": "20240101-001",
                "title": "New model",
                "url": "https://example.com/a",
                "sourceName": "Example",
                "category": "Model",
                "publishedAt": "2024-01-01T00:00:00Z",
                "summary": "A new model was released.",
                "importance": "high"
            }]
        }"#;

        let snapshot: NewsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.last_updated, "2024-01-01T00:00:00Z");
        assert_eq!(snapshot.news.len(), 1);
        assert_eq!(snapshot.news[0].source_name, "Example");
        assert_eq!(snapshot.news[0].category, Category::Model);
        assert_eq!(snapshot.news[0].importance, Importance::High);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let json = r#"{
            "id": "20240101-001", "title": "t", "url": "https://example.com",
            "sourceName": "s", "category": "Hardware",
            "publishedAt": "2024-01-01T00:00:00Z", "summary": "x", "importance": "normal"
        }"#;
        assert!(serde_json::from_str::<NewsArticle>(json).is_err());
    }

    #[test]
    fn test_session_pointer_serialization() {
        let pointer = SessionPointer {
            session_id: "abc".to_string(),
            last_run: "2024-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&pointer).unwrap();
        assert!(json.contains("\"sessionId\":\"abc\""));
        assert!(json.contains("\"lastRun\""));
    }

    #[test]
    fn test_parse_timestamp_iso_forms() {
        let utc = |s: &str| parse_timestamp(s).map(|dt| dt.to_rfc3339());

        assert_eq!(utc("2024-01-05T10:00:00Z").as_deref(), Some("2024-01-05T10:00:00+00:00"));
        assert_eq!(utc("2024-01-05T19:00:00+09:00").as_deref(), Some("2024-01-05T19:00:00+09:00"));
        assert_eq!(utc("2024-01-05T10:00:00").as_deref(), Some("2024-01-05T10:00:00+00:00"));
        assert_eq!(utc("2024-01-05T10:00:00.250").as_deref(), Some("2024-01-05T10:00:00.250+00:00"));
        assert_eq!(utc("2024-01-05T10:00").as_deref(), Some("2024-01-05T10:00:00+00:00"));
        assert_eq!(utc("2024-01-10").as_deref(), Some("2024-01-10T00:00:00+00:00"));
        assert_eq!(utc(" 2024-01-10 ").as_deref(), Some("2024-01-10T00:00:00+00:00"));
    }

    #[test]
    fn test_parse_timestamp_rejects_non_iso() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("Jan 5, 2024").is_none());
        assert!(parse_timestamp("2024-13-01").is_none());
    }

    #[test]
    fn test_filter_tab_cycle() {
        assert_eq!(CategoryFilter::All.next(), CategoryFilter::Only(Category::Model));
        assert_eq!(CategoryFilter::Only(Category::Other).next(), CategoryFilter::All);
        assert_eq!(CategoryFilter::All.prev(), CategoryFilter::Only(Category::Other));
        assert!(CategoryFilter::All.admits(Category::Service));
        assert!(!CategoryFilter::Only(Category::Model).admits(Category::Service));
    }

    #[test]
    fn test_whitelist_admits_by_host_or_name() {
        let wl = Whitelist {
            sources: vec![SourceEntry {
                url: "https://openai.com/news".to_string(),
                source_name: "OpenAI".to_string(),
            }],
        };
        let mut a = fixtures::article("20240101-001", Category::Model, Importance::High, "");
        a.url = "https://blog.openai.com/post".to_string();
        a.source_name = "Somebody".to_string();
        assert!(wl.admits(&a));

        a.url = "https://elsewhere.org/post".to_string();
        assert!(!wl.admits(&a));

        a.source_name = "OpenAI".to_string();
        assert!(wl.admits(&a));
    }
}
