//! Configuration management for fdb
//!
//! Handles loading, validating, and persisting client settings (host,
//! timeout, path convention) and the Fluidinfo credentials file.

use crate::error::{CliError, Result};
use crate::paths::PathStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod credentials;
pub mod defaults;

pub use credentials::Credentials;
pub use defaults::*;

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// API server URL
    #[serde(default = "defaults::default_host")]
    pub host: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::default_timeout")]
    pub timeout_secs: u64,

    /// Force unix-style (`true`) or Fluidinfo-style (`false`) paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unix_style_paths: Option<bool>,

    /// Log every request and response
    #[serde(default)]
    pub debug: bool,
}

/// Settings given on the command line; `None` leaves the file's value alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// API server URL
    pub host: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Force unix-style (`true`) or Fluidinfo-style (`false`) paths
    pub unix_style_paths: Option<bool>,
    /// Log every request and response
    pub debug: bool,
}

impl Config {
    /// Load configuration from the default location
    ///
    /// Tries in order:
    /// 1. `XDG_CONFIG_HOME/fdb/config.toml`
    /// 2. `~/.config/fdb/config.toml`
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| CliError::ConfigRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| CliError::InvalidConfig(e.to_string()))
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CliError::ConfigWrite {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| CliError::SerializationError(e.to_string()))?;

        fs::write(path, contents).map_err(|e| CliError::ConfigWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .and_then(|path| if path.is_empty() { None } else { Some(path) })
            .or_else(|| {
                dirs::home_dir().map(|home| home.join(".config").to_string_lossy().to_string())
            });

        config_home
            .ok_or_else(|| {
                CliError::Internal(
                    "Could not determine config directory: XDG_CONFIG_HOME not set and no home directory found"
                        .to_string(),
                )
            })
            .map(|path| PathBuf::from(path).join("fdb").join("config.toml"))
    }

    /// Apply command-line overrides; every value given replaces the file's
    pub fn merge(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.host.clone_from(host);
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if overrides.unix_style_paths.is_some() {
            self.unix_style_paths = overrides.unix_style_paths;
        }
        if overrides.debug {
            self.debug = true;
        }
    }

    /// Settings file from the default location with `overrides` applied, validated
    pub fn load_with(overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = Self::load()?;
        config.merge(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(CliError::InvalidConfig("host cannot be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(CliError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Host URL with a scheme; `http://` is added when none was given
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{host}")
        }
    }

    /// Request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Path convention: this config first, then the credentials file, then
    /// Fluidinfo style
    #[must_use]
    pub fn path_style(&self, credentials: &Credentials) -> PathStyle {
        self.unix_style_paths
            .or(credentials.unix_style_paths)
            .map_or_else(PathStyle::default, PathStyle::from_unix_flag)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout_secs: default_timeout(),
            unix_style_paths: None,
            debug: false,
        }
    }
}
