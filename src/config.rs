//! Configuration file support for episode-explorer.
//!
//! This module provides functionality for loading and saving user preferences
//! from a TOML configuration file.

use crate::error::{AppError, Result};
use crate::query::{SortField, SortState};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Endpoint serving the episode list.
pub const DEFAULT_API_URL: &str = "https://raw.githubusercontent.com/sweko/internet-programming-adefinater/refs/heads/main/data/doctor-who-episodes.json";

const USER_AGENT: &str = concat!("episode-explorer/", env!("CARGO_PKG_VERSION"));

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL of the JSON episode list
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with the request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Column sorted by at startup: rank, title, series, era, broadcast or rating
    #[serde(default = "default_sort")]
    pub default_sort: String,

    /// Whether the startup sort is descending
    #[serde(default)]
    pub default_descending: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

fn default_sort() -> String {
    "rank".to_string()
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            default_sort: default_sort(),
            default_descending: false,
        }
    }

    /// The sort state configured for startup.
    pub fn sort_state(&self) -> Result<SortState> {
        let field: SortField = self.default_sort.parse()?;
        Ok(SortState {
            field,
            ascending: !self.default_descending,
        })
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/episode-explorer/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> std::result::Result<PathBuf, io::Error> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("episode-explorer");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Parse a config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.timeout_secs == 0 {
            return Err(AppError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(config)
    }

    /// Save config to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::get_config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Create a default config file if one doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            Self::new().save()?;
        }

        Ok(path)
    }
}
