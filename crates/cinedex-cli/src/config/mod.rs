//! Application configuration module.
//!
//! Manages the TOML config file holding API endpoint, language and retry
//! defaults.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{ApiConfig, AppConfig, RetryConfig};
pub use paths::resolve_config_path;
