//! Single-shot snapshot loading for the reader.
//!
//! The reader accepts either a deployed site (`https://host/base/`), in which
//! case `data/current.json` is fetched relative to the base path, or a local
//! file or directory. There is no retry; a failure is shown to the user, who
//! can trigger a full reload.

use crate::models::NewsSnapshot;
use crate::snapshot::{SNAPSHOT_PATH, validate};
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

/// Why the snapshot could not be loaded. The message is shown verbatim.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to load news: {0}")]
    Status(StatusCode),

    #[error("Failed to load news: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed news data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid source {raw:?}: {source}")]
    Source {
        raw: String,
        #[source]
        source: url::ParseError,
    },
}

/// Where the snapshot comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    Remote(Url),
    Local(PathBuf),
}

impl SnapshotSource {
    /// Interpret a `--source` argument.
    ///
    /// - `http(s)://…/file.json` is fetched as given.
    /// - Any other `http(s)` URL is a base path; `data/current.json` is
    ///   joined onto it.
    /// - A directory gets `data/current.json` appended; anything else is
    ///   taken as the snapshot file itself.
    pub fn parse(raw: &str) -> Result<Self, LoadError> {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            let source_err = |source| LoadError::Source {
                raw: raw.to_string(),
                source,
            };
            let mut base = Url::parse(raw).map_err(source_err)?;
            if base.path().ends_with(".json") {
                return Ok(SnapshotSource::Remote(base));
            }
            if !base.path().ends_with('/') {
                let path = format!("{}/", base.path());
                base.set_path(&path);
            }
            let url = base.join(SNAPSHOT_PATH).map_err(source_err)?;
            return Ok(SnapshotSource::Remote(url));
        }

        let path = PathBuf::from(raw);
        if path.is_dir() {
            Ok(SnapshotSource::Local(path.join(SNAPSHOT_PATH)))
        } else {
            Ok(SnapshotSource::Local(path))
        }
    }
}

impl std::fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotSource::Remote(url) => write!(f, "{url}"),
            SnapshotSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load the snapshot once.
///
/// Any non-2xx response is a failure carrying the status code. Integrity
/// problems in a snapshot that parses are logged but do not fail the load.
#[instrument(level = "info", skip_all, fields(source = %source))]
pub async fn fetch_snapshot(source: &SnapshotSource) -> Result<NewsSnapshot, LoadError> {
    let body = match source {
        SnapshotSource::Remote(url) => {
            let response = reqwest::get(url.clone()).await?;
            let status = response.status();
            if !status.is_success() {
                warn!(%status, "Snapshot request failed");
                return Err(LoadError::Status(status));
            }
            response.text().await?
        }
        SnapshotSource::Local(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| LoadError::Io {
                    path: path.display().to_string(),
                    source,
                })?
        }
    };

    let snapshot: NewsSnapshot = serde_json::from_str(&body)?;
    for issue in validate(&snapshot, None) {
        warn!(%issue, "Snapshot integrity problem");
    }
    info!(articles = snapshot.news.len(), "Snapshot loaded");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY: &str = r#"{"lastUpdated":"2024-01-01T00:00:00Z","news":[]}"#;

    #[test]
    fn test_parse_base_url_keeps_base_path() {
        let source = SnapshotSource::parse("https://example.github.io/ai-pulse").unwrap();
        assert_eq!(
            source,
            SnapshotSource::Remote(
                Url::parse("https://example.github.io/ai-pulse/data/current.json").unwrap()
            )
        );

        let source = SnapshotSource::parse("https://example.github.io/").unwrap();
        assert_eq!(source.to_string(), "https://example.github.io/data/current.json");
    }

    #[test]
    fn test_parse_direct_json_url() {
        let source = SnapshotSource::parse("https://cdn.example.com/feed.json").unwrap();
        assert_eq!(source.to_string(), "https://cdn.example.com/feed.json");
    }

    #[test]
    fn test_parse_local_dir_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let source = SnapshotSource::parse(tmp.path().to_str().unwrap()).unwrap();
        assert_eq!(source, SnapshotSource::Local(tmp.path().join("data/current.json")));

        let file = tmp.path().join("snap.json");
        let source = SnapshotSource::parse(file.to_str().unwrap()).unwrap();
        assert_eq!(source, SnapshotSource::Local(file));
    }

    #[tokio::test]
    async fn test_remote_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pulse/data/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .mount(&server)
            .await;

        let source = SnapshotSource::parse(&format!("{}/pulse/", server.uri())).unwrap();
        let snapshot = fetch_snapshot(&source).await.unwrap();
        assert_eq!(snapshot.last_updated, "2024-01-01T00:00:00Z");
        assert!(snapshot.news.is_empty());
    }

    #[tokio::test]
    async fn test_remote_500_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = SnapshotSource::parse(&server.uri()).unwrap();
        let err = fetch_snapshot(&source).await.unwrap_err();
        assert!(matches!(err, LoadError::Status(s) if s.as_u16() == 500));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_local_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let source = SnapshotSource::Local(tmp.path().join("nope.json"));
        let err = fetch_snapshot(&source).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("nope.json"));
    }

    #[tokio::test]
    async fn test_local_malformed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("current.json");
        std::fs::write(&file, r#"{"lastUpdated":"x"}"#).unwrap();
        let err = fetch_snapshot(&SnapshotSource::Local(file)).await.unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }
}
