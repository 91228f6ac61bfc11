//! `AppConfig` struct and TOML read/write.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use cinedex_api::catalog::DEFAULT_LANGUAGE;
use cinedex_api::gateway::{DEFAULT_BASE_URL, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT, EnvToken};
use serde::{Deserialize, Serialize};
use url::Url;

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// API endpoint and request defaults.
    #[serde(default)]
    pub api: ApiConfig,
    /// Retry defaults for listing requests.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// `[api]` section.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// API base URL.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Default response language.
    pub language: String,
    /// Default region for movie listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Environment variable holding the bearer token.
    pub token_env: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
            language: String::from(DEFAULT_LANGUAGE),
            region: None,
            token_env: String::from(EnvToken::DEFAULT_VAR),
        }
    }
}

impl ApiConfig {
    /// Parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).with_context(|| format!("invalid api.base_url: {}", self.base_url))
    }

    /// Request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout_ms` is zero.
    pub fn timeout(&self) -> Result<Duration> {
        if self.timeout_ms == 0 {
            bail!("api.timeout_ms must be greater than zero");
        }
        Ok(Duration::from_millis(self.timeout_ms))
    }
}

/// `[retry]` section.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub count: u32,
    /// Base backoff delay in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            count: 0,
            delay_ms: u64::try_from(DEFAULT_RETRY_DELAY.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl RetryConfig {
    /// Base backoff delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
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
        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    /// Renders the config as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config to TOML")
    }
}
