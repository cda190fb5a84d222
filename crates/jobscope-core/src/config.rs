//! Configuration types for Jobscope components.
//!
//! Settings come from an optional TOML file at
//! `<config_dir>/jobscope/config.toml`; anything not set there falls back to
//! the defaults below. Command-line flags override both.
//!
//! ```toml
//! [source]
//! snapshot_url = "https://example.org/job_analysis.db"
//! snapshot_path = "/var/lib/jobscope/job_analysis.db"
//! geojson_path = "/var/lib/jobscope/bundeslaender.geojson"
//!
//! [terms]
//! path = "/var/lib/jobscope/job_titles.json"
//!
//! [http]
//! timeout_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::AppError;

/// Shared download location of the published snapshot.
pub const DEFAULT_SNAPSHOT_URL: &str =
    "https://drive.google.com/uc?id=1av6u76MAICXikg6f7gLmBsU8NAaOquYc";

pub const DEFAULT_TABLE_NAME: &str = "job_analysis";

/// Identifier of the mirrored term-list document.
pub const TERM_DOCUMENT_ID: &str = "current_job_titles";

/// Root of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    pub terms: TermsConfig,
    pub http: HttpConfig,
    pub db: DbConfig,
}

impl DashboardConfig {
    /// Rejects settings that would be unsafe to use.
    ///
    /// The table name ends up in SQL text, so it must be a plain identifier.
    pub fn validate(&self) -> Result<(), AppError> {
        let table = &self.source.table_name;
        let is_identifier = !table.is_empty()
            && !table.starts_with(|c: char| c.is_ascii_digit())
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !is_identifier {
            return Err(AppError::ConfigError(format!(
                "table_name '{}' is not a valid identifier",
                table
            )));
        }

        if self.source.snapshot_url.trim().is_empty() {
            return Err(AppError::ConfigError("snapshot_url is empty".to_string()));
        }

        Ok(())
    }
}

/// Where the job advertisement data comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub snapshot_url: String,
    pub snapshot_path: PathBuf,
    pub table_name: String,
    pub geojson_path: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            snapshot_url: DEFAULT_SNAPSHOT_URL.to_string(),
            snapshot_path: data_dir().join("job_analysis.db"),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            geojson_path: None,
        }
    }
}

/// Local storage and upstream identity of the search-term list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermsConfig {
    pub path: PathBuf,
    pub document_id: String,
}

impl Default for TermsConfig {
    fn default() -> Self {
        Self {
            path: data_dir().join("job_titles.json"),
            document_id: TERM_DOCUMENT_ID.to_string(),
        }
    }
}

/// HTTP client configuration for the snapshot download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 500,
        }
    }
}

/// Connection pool configuration for the term-list mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("jobscope"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default location of the configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jobscope").join("config.toml"))
}

/// Loads the configuration.
///
/// With an explicit `path` the file must exist. Without one, the default
/// location is tried and a missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig, AppError> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => {
                debug!("No configuration directory on this platform, using defaults");
                return Ok(DashboardConfig::default());
            }
        },
    };

    if !path.exists() {
        if explicit {
            return Err(AppError::ConfigError(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        debug!("No config file at {}, using defaults", path.display());
        return Ok(DashboardConfig::default());
    }

    let text = std::fs::read_to_string(&path)?;
    let config: DashboardConfig = toml::from_str(&text)
        .map_err(|e| AppError::ConfigError(format!("{}: {}", path.display(), e)))?;
    config.validate()?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
