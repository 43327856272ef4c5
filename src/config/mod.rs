//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::calculate::{LeagueSettings, DEFAULT_MATCH_CAP};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// League rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Display name used in replies
    #[serde(default = "default_league_name")]
    pub name: String,

    /// Expected matches between each pair of players
    #[serde(default = "default_match_cap")]
    pub match_cap: u32,

    /// Use the source's precomputed matrix tab when available
    #[serde(default = "default_true")]
    pub prefer_external_matrix: bool,
}

fn default_league_name() -> String {
    "MTG League".to_string()
}

fn default_match_cap() -> u32 {
    DEFAULT_MATCH_CAP
}

fn default_true() -> bool {
    true
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            name: default_league_name(),
            match_cap: default_match_cap(),
            prefer_external_matrix: default_true(),
        }
    }
}

impl LeagueConfig {
    pub fn settings(&self) -> LeagueSettings {
        LeagueSettings {
            match_cap: self.match_cap,
            prefer_external_matrix: self.prefer_external_matrix,
        }
    }
}

/// Which data source to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// SheetDB-style JSON API over a spreadsheet
    Sheetdb,
    /// JSON files in a local directory
    File,
}

/// Data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,

    /// Base URL of the spreadsheet API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sheet (tab) holding the match ledger
    #[serde(default = "default_matches_sheet")]
    pub matches_sheet: String,

    /// Sheet holding a precomputed PvP grid, if any
    #[serde(default)]
    pub matrix_sheet: Option<String>,

    /// Directory for the file source
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Max retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_source_kind() -> SourceKind {
    SourceKind::Sheetdb
}

fn default_base_url() -> String {
    "https://sheetdb.io/api/v1/your-sheet-id".to_string()
}

fn default_matches_sheet() -> String {
    "matches_games".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            base_url: default_base_url(),
            matches_sheet: default_matches_sheet(),
            matrix_sheet: None,
            data_dir: default_data_dir(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub league: LeagueConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            league: LeagueConfig::default(),
            source: SourceConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.league.match_cap == 0 {
            return Err(ConfigError::ValidationError(
                "Match cap must be greater than 0".to_string(),
            ));
        }

        if self.source.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Source timeout must be greater than 0".to_string(),
            ));
        }

        if self.source.kind == SourceKind::Sheetdb {
            Url::parse(&self.source.base_url).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "Invalid source base_url {:?}: {}",
                    self.source.base_url, e
                ))
            })?;
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
