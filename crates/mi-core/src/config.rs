//! Configuration management for mi-export

use crate::error::{ExportError, Result};
use crate::types::RemoteFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Project-local configuration file
pub const DEFAULT_CONFIG_PATH: &str = ".mi-export/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote export service settings
    pub remote: RemoteConfig,
    /// Download settings
    pub download: DownloadConfig,
    /// Local export settings
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ExportError::Io(e).with_context(format!("Failed to read {}", path.display()))
        })?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ExportError::Toml(e.to_string()))?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load an explicit file, else the project file if present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ExportError::Toml(e.to_string()))
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        let base_url = self.remote.base_url.trim();
        if base_url.is_empty() {
            return Err(ExportError::Config("remote.base_url cannot be empty".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ExportError::Config(format!(
                "remote.base_url must be an http(s) URL, got '{}'",
                base_url
            )));
        }
        if self.remote.timeout_secs == 0 {
            return Err(ExportError::Config(
                "remote.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.download.max_bytes == 0 {
            return Err(ExportError::Config(
                "download.max_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Remote export service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL every endpoint is resolved against
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Create a configuration for another base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Absolute URL for an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8004".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Download-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Target directory; the user's download directory when unset
    pub output_dir: Option<PathBuf>,
    /// Replace existing files instead of numbering new ones
    pub overwrite: bool,
    /// Largest payload that will be saved
    pub max_bytes: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            overwrite: false,
            max_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Local export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Format requested from the remote service when none is given
    pub default_format: RemoteFormat,
    /// Pretty-print JSON exports
    pub pretty_json: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: RemoteFormat::Csv,
            pretty_json: true,
        }
    }
}
