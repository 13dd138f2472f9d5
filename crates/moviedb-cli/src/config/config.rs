//! `AppConfig` struct and TOML read/write.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use moviedb_api::tmdb::{DEFAULT_LANGUAGE, ProxySettings};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `api.key`.
pub const API_KEY_ENV: &str = "MOVIEDB_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// API access settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Upstream HTTP proxy. Omit the section to connect directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
    /// Network timeouts.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

/// `[api]` section.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// API key. `MOVIEDB_API_KEY` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Default response language; also the `movie info` fallback.
    #[serde(default = "default_language")]
    pub language: String,
    /// Base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            language: default_language(),
            base_url: None,
        }
    }
}

fn default_language() -> String {
    String::from(DEFAULT_LANGUAGE)
}

/// `[proxy]` section.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy host.
    pub host: String,
    /// Proxy port.
    pub port: u16,
    /// Basic-auth username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Basic-auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Converts to the client's proxy settings.
    pub fn to_settings(&self) -> ProxySettings {
        ProxySettings {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// `[timeouts]` section.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeoutsConfig {
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_secs")]
    pub connect_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_secs")]
    pub read_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            connect_secs: default_connect_secs(),
            read_secs: default_read_secs(),
        }
    }
}

const fn default_connect_secs() -> u64 {
    25
}

const fn default_read_secs() -> u64 {
    90
}

impl TimeoutsConfig {
    /// Connect timeout.
    pub const fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    /// Read timeout.
    pub const fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Resolves the API key: `env_key` (from `MOVIEDB_API_KEY`) wins over
    /// `api.key`. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if neither source provides a key.
    pub fn api_key(&self, env_key: Option<String>) -> Result<String> {
        env_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                self.api
                    .key
                    .clone()
                    .filter(|key| !key.trim().is_empty())
            })
            .with_context(|| format!("API key is required: set {API_KEY_ENV} or api.key"))
    }
}
