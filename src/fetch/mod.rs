//! Data sources.
//!
//! A [`DataSource`] supplies the raw standings, match and (optionally)
//! precomputed matrix rows. [`acquire_snapshot`] fetches all of them up front
//! so the engine only ever sees a frozen [`LeagueSnapshot`].
//!
//! - [`SheetDbSource`]: spreadsheet exposed as a JSON API (one array of row
//!   objects per sheet tab)
//! - [`FileSource`]: the same arrays stored as JSON files
//! - [`MemorySource`]: fixed rows, for tests and embedding

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{SourceConfig, SourceKind};
use crate::models::{LeagueSnapshot, RawRow};

/// Errors that can occur while fetching source data.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed source data: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Whether a retry might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            SourceError::RateLimited { .. } => true,
            SourceError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Retry policy for remote sources.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    /// Upper bound on any single wait, including server-requested ones
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            backoff_multiplier: 2.0,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let millis = (self.initial_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Duration::from_millis(millis as u64)
    }

    /// Wait requested by a rate-limited server, capped at `max_delay_ms`.
    pub fn rate_limit_delay(&self, retry_after_secs: u64) -> Duration {
        Duration::from_secs(retry_after_secs).min(Duration::from_millis(self.max_delay_ms))
    }
}

/// Supplier of raw league rows.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Source identifier for logging.
    fn name(&self) -> &'static str;

    /// Standings rows, in source order.
    async fn fetch_standings(&self) -> Result<Vec<RawRow>, SourceError>;

    /// Match rows, in source (chronological) order.
    async fn fetch_matches(&self) -> Result<Vec<RawRow>, SourceError>;

    /// Precomputed matrix rows; `None` when the source has no such grid.
    async fn fetch_matrix(&self) -> Result<Option<Vec<RawRow>>, SourceError> {
        Ok(None)
    }
}

/// Fetch every resource and freeze them into a snapshot.
pub async fn acquire_snapshot(source: &dyn DataSource) -> Result<LeagueSnapshot, SourceError> {
    let (standings, matches, matrix) = tokio::try_join!(
        source.fetch_standings(),
        source.fetch_matches(),
        source.fetch_matrix()
    )?;

    info!(
        "Snapshot from {}: {} standings rows, {} match rows{}",
        source.name(),
        standings.len(),
        matches.len(),
        if matrix.is_some() { ", matrix grid" } else { "" }
    );

    Ok(LeagueSnapshot {
        standings,
        matches,
        matrix,
        fetched_at: Utc::now(),
    })
}

/// Build the source described by the configuration.
pub fn build_source(config: &SourceConfig) -> Result<Arc<dyn DataSource>, SourceError> {
    match config.kind {
        SourceKind::Sheetdb => Ok(Arc::new(SheetDbSource::from_config(config)?)),
        SourceKind::File => Ok(Arc::new(FileSource::new(config.data_dir.clone()))),
    }
}

/// Configuration for the spreadsheet API source.
#[derive(Debug, Clone)]
pub struct SheetDbConfig {
    /// API endpoint; the standings live on the default tab
    pub base_url: Url,

    /// Tab holding the match ledger
    pub matches_sheet: String,

    /// Tab holding a precomputed matrix
    pub matrix_sheet: Option<String>,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,

    pub retry: RetryPolicy,
}

/// Spreadsheet-backed source speaking the SheetDB JSON API.
pub struct SheetDbSource {
    client: Client,
    config: SheetDbConfig,
}

impl SheetDbSource {
    /// Create a source with the given configuration.
    pub fn new(config: SheetDbConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("league-stats/0.1.0")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        Self::new(SheetDbConfig {
            base_url,
            matches_sheet: config.matches_sheet.clone(),
            matrix_sheet: config.matrix_sheet.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            user_agent: format!("league-stats/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                ..RetryPolicy::default()
            },
        })
    }

    /// URL for a sheet tab; `None` is the default tab.
    pub fn sheet_url(&self, sheet: Option<&str>) -> Url {
        let mut url = self.config.base_url.clone();
        if let Some(sheet) = sheet {
            url.query_pairs_mut().append_pair("sheet", sheet);
        }
        url
    }

    async fn get_rows(&self, url: &Url) -> Result<Vec<RawRow>, SourceError> {
        let mut attempt = 0;
        loop {
            match self.get_rows_once(url).await {
                Ok(rows) => return Ok(rows),
                Err(e) if e.is_transient() && attempt < self.config.retry.max_retries => {
                    attempt += 1;
                    let wait = match &e {
                        SourceError::RateLimited {
                            retry_after_secs, ..
                        } => self.config.retry.rate_limit_delay(*retry_after_secs),
                        _ => self.config.retry.delay(attempt),
                    };
                    warn!(
                        "Fetching {} failed (attempt {}/{}): {}; retrying in {:?}",
                        url, attempt, self.config.retry.max_retries, e, wait
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_rows_once(&self, url: &Url) -> Result<Vec<RawRow>, SourceError> {
        debug!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(SourceError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        parse_rows(&body)
    }
}

#[async_trait]
impl DataSource for SheetDbSource {
    fn name(&self) -> &'static str {
        "sheetdb"
    }

    async fn fetch_standings(&self) -> Result<Vec<RawRow>, SourceError> {
        self.get_rows(&self.sheet_url(None)).await
    }

    async fn fetch_matches(&self) -> Result<Vec<RawRow>, SourceError> {
        let url = self.sheet_url(Some(&self.config.matches_sheet));
        self.get_rows(&url).await
    }

    async fn fetch_matrix(&self) -> Result<Option<Vec<RawRow>>, SourceError> {
        match &self.config.matrix_sheet {
            Some(sheet) => Ok(Some(self.get_rows(&self.sheet_url(Some(sheet))).await?)),
            None => Ok(None),
        }
    }
}

/// Parse a JSON array of row objects.
pub fn parse_rows(body: &str) -> Result<Vec<RawRow>, SourceError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_array() {
        return Err(SourceError::Malformed(
            "expected a JSON array of rows".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

/// JSON files in a directory: `standings.json`, `matches.json` and an
/// optional `matrix.json`.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub const STANDINGS_FILE: &'static str = "standings.json";
    pub const MATCHES_FILE: &'static str = "matches.json";
    pub const MATRIX_FILE: &'static str = "matrix.json";

    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_rows(&self, file: &str) -> Result<Vec<RawRow>, SourceError> {
        let path = self.dir.join(file);
        debug!("Reading {:?}", path);
        let body = fs::read_to_string(&path).await?;
        parse_rows(&body)
    }
}

#[async_trait]
impl DataSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch_standings(&self) -> Result<Vec<RawRow>, SourceError> {
        self.read_rows(Self::STANDINGS_FILE).await
    }

    async fn fetch_matches(&self) -> Result<Vec<RawRow>, SourceError> {
        self.read_rows(Self::MATCHES_FILE).await
    }

    async fn fetch_matrix(&self) -> Result<Option<Vec<RawRow>>, SourceError> {
        if !self.dir.join(Self::MATRIX_FILE).exists() {
            return Ok(None);
        }
        Ok(Some(self.read_rows(Self::MATRIX_FILE).await?))
    }
}

/// Fixed in-memory rows.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub standings: Vec<RawRow>,
    pub matches: Vec<RawRow>,
    pub matrix: Option<Vec<RawRow>>,
}

impl MemorySource {
    pub fn new(standings: Vec<RawRow>, matches: Vec<RawRow>) -> Self {
        Self {
            standings,
            matches,
            matrix: None,
        }
    }
}

#[async_trait]
impl DataSource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_standings(&self) -> Result<Vec<RawRow>, SourceError> {
        Ok(self.standings.clone())
    }

    async fn fetch_matches(&self) -> Result<Vec<RawRow>, SourceError> {
        Ok(self.matches.clone())
    }

    async fn fetch_matrix(&self) -> Result<Option<Vec<RawRow>>, SourceError> {
        Ok(self.matrix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn sheet_config(base_url: &str) -> SheetDbConfig {
        SheetDbConfig {
            base_url: Url::parse(base_url).unwrap(),
            matches_sheet: "matches_games".to_string(),
            matrix_sheet: None,
            timeout: Duration::from_secs(5),
            user_agent: "league-stats-test".to_string(),
            retry: RetryPolicy {
                max_retries: 2,
                initial_delay_ms: 1,
                backoff_multiplier: 1.0,
                max_delay_ms: 5,
            },
        }
    }

    /// Serve a fake spreadsheet API on an ephemeral port.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/v1/test", addr)
    }

    async fn sheet(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        match params.get("sheet").map(String::as_str) {
            None => Json(json!([
                {"Rank": "1", "Player Name": "Alice"},
                {"Rank": "2", "Player Name": "Bob"}
            ])),
            Some("matches_games") => Json(json!([
                {"P1": "Alice", "P2": "Bob", "Winner": "Alice", "Loser": "Bob"}
            ])),
            Some(_) => Json(json!([])),
        }
    }

    #[test]
    fn test_retry_policy_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_millis(1000));
        assert_eq!(policy.delay(2), Duration::from_millis(2000));
        assert_eq!(policy.delay(3), Duration::from_millis(4000));
        assert_eq!(policy.delay(10), Duration::from_millis(10_000));
    }

    #[test]
    fn test_rate_limit_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.rate_limit_delay(2), Duration::from_secs(2));
        assert_eq!(policy.rate_limit_delay(60), Duration::from_millis(10_000));
    }

    #[test]
    fn test_transient_errors() {
        let server = SourceError::HttpStatus {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        let missing = SourceError::HttpStatus {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert!(server.is_transient());
        assert!(!missing.is_transient());
        assert!(!SourceError::Malformed("x".to_string()).is_transient());
    }

    #[test]
    fn test_sheet_url() {
        let source = SheetDbSource::new(sheet_config("https://sheetdb.io/api/v1/abc")).unwrap();
        assert_eq!(
            source.sheet_url(None).as_str(),
            "https://sheetdb.io/api/v1/abc"
        );
        assert_eq!(
            source.sheet_url(Some("matches games")).as_str(),
            "https://sheetdb.io/api/v1/abc?sheet=matches+games"
        );
    }

    #[test]
    fn test_parse_rows() {
        let rows = parse_rows(r#"[{"P1": "Alice", "P2": "Bob"}, {}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("p1"), Some("Alice"));
        assert!(rows[1].is_empty());

        assert!(matches!(
            parse_rows(r#"{"error": "not found"}"#),
            Err(SourceError::Malformed(_))
        ));
        assert!(matches!(parse_rows("<html>"), Err(SourceError::Json(_))));
    }

    #[test]
    fn test_memory_source_snapshot() {
        let source = MemorySource::new(
            vec![RawRow::new().with("Player Name", "Alice")],
            vec![RawRow::new().with("P1", "Alice").with("P2", "Bob")],
        );
        let snapshot = tokio_test::block_on(acquire_snapshot(&source)).unwrap();
        assert_eq!(snapshot.standings.len(), 1);
        assert_eq!(snapshot.matches.len(), 1);
        assert!(snapshot.matrix.is_none());
    }

    #[tokio::test]
    async fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(FileSource::STANDINGS_FILE),
            r#"[{"Rank": 1, "Player Name": "Alice"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(FileSource::MATCHES_FILE),
            r#"[{"P1": "Alice", "P2": "Bob", "Winner": "Bob"}]"#,
        )
        .unwrap();

        let source = FileSource::new(dir.path().to_path_buf());
        let snapshot = acquire_snapshot(&source).await.unwrap();
        assert_eq!(snapshot.standings[0].count("rank"), Some(1));
        assert_eq!(snapshot.matches[0].text("winner"), Some("Bob"));
        assert!(snapshot.matrix.is_none());

        std::fs::write(
            dir.path().join(FileSource::MATRIX_FILE),
            r#"[{"Player": "Alice", "Bob": "0 (0%)"}]"#,
        )
        .unwrap();
        let snapshot = acquire_snapshot(&source).await.unwrap();
        assert_eq!(snapshot.matrix.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().to_path_buf());
        assert!(matches!(
            acquire_snapshot(&source).await,
            Err(SourceError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_sheetdb_source_fetches_tabs() {
        let base = serve(Router::new().route("/api/v1/test", get(sheet))).await;
        let source = SheetDbSource::new(sheet_config(&base)).unwrap();

        let snapshot = acquire_snapshot(&source).await.unwrap();
        assert_eq!(snapshot.standings.len(), 2);
        assert_eq!(snapshot.standings[1].text("player name"), Some("Bob"));
        assert_eq!(snapshot.matches.len(), 1);
        assert_eq!(snapshot.matches[0].text("winner"), Some("Alice"));
        assert!(snapshot.matrix.is_none());
    }

    #[tokio::test]
    async fn test_sheetdb_source_retries_server_errors() {
        async fn flaky(State(hits): State<Arc<AtomicUsize>>) -> Result<Json<Value>, StatusCode> {
            if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(StatusCode::SERVICE_UNAVAILABLE)
            } else {
                Ok(Json(json!([{"Player Name": "Alice"}])))
            }
        }

        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/api/v1/test", get(flaky))
            .with_state(hits.clone());
        let base = serve(app).await;
        let source = SheetDbSource::new(sheet_config(&base)).unwrap();

        let rows = source.fetch_standings().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sheetdb_source_rate_limit_without_retry_after() {
        async fn limited(State(hits): State<Arc<AtomicUsize>>) -> Result<Json<Value>, StatusCode> {
            if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(StatusCode::TOO_MANY_REQUESTS)
            } else {
                Ok(Json(json!([{"Player Name": "Alice"}])))
            }
        }

        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/api/v1/test", get(limited))
            .with_state(hits.clone());
        let base = serve(app).await;
        let source = SheetDbSource::new(sheet_config(&base)).unwrap();

        // The 60s default wait is capped by the policy's 5ms ceiling.
        let rows = tokio::time::timeout(Duration::from_secs(5), source.fetch_standings())
            .await
            .expect("rate-limit wait should be capped")
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sheetdb_source_gives_up_on_client_errors() {
        let app = Router::new().route("/api/v1/test", get(|| async { StatusCode::NOT_FOUND }));
        let base = serve(app).await;
        let source = SheetDbSource::new(sheet_config(&base)).unwrap();

        let err = source.fetch_standings().await.unwrap_err();
        assert!(matches!(err, SourceError::HttpStatus { status: 404, .. }));
    }
}
