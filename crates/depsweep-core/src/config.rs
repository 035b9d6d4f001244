// SPDX-License-Identifier: Apache-2.0

//! Configuration management for depsweep.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `DEPSWEEP_`)
//! 2. Config file: `~/.config/depsweep/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Point at a staging backend
//! DEPSWEEP_API__BASE_URL=https://staging.example.com depsweep scan
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ScanError;

/// Environment variable holding the backend access token.
pub const TOKEN_ENV_VAR: &str = "DEPSWEEP_TOKEN";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend API settings.
    pub api: ApiConfig,
    /// Scan defaults.
    pub scan: ScanConfig,
}

/// Backend API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Delay between result polls in seconds.
    pub poll_interval_seconds: u64,
    /// Give up polling after this many seconds.
    pub poll_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.depsweep.dev".to_string(),
            timeout_seconds: 60,
            poll_interval_seconds: 5,
            poll_timeout_seconds: 600,
        }
    }
}

impl ApiConfig {
    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Delay between result polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Polling deadline.
    #[must_use]
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_seconds)
    }
}

/// Scan defaults, overridable per run from the command line.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Call graph generation timeout in seconds.
    pub callgraph_generate_timeout_seconds: u64,
    /// Call graph upload timeout in seconds.
    pub callgraph_upload_timeout_seconds: u64,
    /// Files shorter than this are not fingerprinted.
    pub min_fingerprint_content_length: usize,
    /// Treat a polling timeout as success.
    pub pass_on_timeout: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            callgraph_generate_timeout_seconds: 3600,
            callgraph_upload_timeout_seconds: 600,
            min_fingerprint_content_length: crate::file::fingerprint::DEFAULT_MIN_CONTENT_LENGTH,
            pass_on_timeout: false,
        }
    }
}

/// Returns the depsweep configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/depsweep`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join("depsweep");
    }
    dirs::home_dir()
        .expect("Could not determine home directory - is HOME set?")
        .join(".config")
        .join("depsweep")
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration.
///
/// Loads from config file (if exists) and environment variables.
/// Environment variables use the prefix `DEPSWEEP_` and double underscore
/// for nested keys (e.g., `DEPSWEEP_API__BASE_URL`).
///
/// # Errors
///
/// Returns `ScanError::Config` if the config file exists but is invalid.
pub fn load_config() -> Result<AppConfig, ScanError> {
    let config_path = config_file_path();

    let config = Config::builder()
        .add_source(File::with_name(config_path.to_string_lossy().as_ref()).required(false))
        .add_source(
            Environment::with_prefix("DEPSWEEP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    Ok(app_config)
}

/// Reads the backend token from the environment.
#[must_use]
pub fn token_from_env() -> Option<SecretString> {
    std::env::var(TOKEN_ENV_VAR)
        .ok()
        .filter(|token| !token.is_empty())
        .map(|token| SecretString::new(token.into()))
}
