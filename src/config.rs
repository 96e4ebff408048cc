//! Settings for internscout.
//!
//! Settings come from a TOML file (`internscout.toml` next to the current
//! directory by default) with environment overrides for credentials. Every
//! section has working defaults so `iscout search` runs against a fresh
//! checkout once an API key is present.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ingest::FilterConfig;

/// Default settings file name.
pub const SETTINGS_FILE: &str = "internscout.toml";

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "INTERNSCOUT_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Third-party dataset provider settings. The API key is never stored in
/// the settings file; it is read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider name recorded on stored postings.
    pub name: String,
    /// Dataset API base URL.
    pub base_url: String,
    /// Snapshot to read postings from.
    pub snapshot_id: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Discovery retry attempts (exponential backoff between tries).
    pub retry_attempts: u32,
    /// Filled from the environment at load time.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "linkedin".to_string(),
            base_url: "https://api.brightdata.com/datasets/v3".to_string(),
            snapshot_id: String::new(),
            timeout_secs: 60,
            retry_attempts: 3,
            api_key: None,
        }
    }
}

/// Search defaults applied when the CLI does not override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum postings stored per run.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: 50 }
    }
}

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub search: SearchConfig,
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("internscout.db"),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no file exists. The
    /// provider API key is always taken from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));

        let mut settings = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Self::default()
        };

        settings.provider.api_key = std::env::var(API_KEY_ENV).ok();
        Ok(settings)
    }

    /// Write the current settings (defaults included) to `path`.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
