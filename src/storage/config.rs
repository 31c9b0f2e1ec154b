//! Configuration handling
//!
//! Configuration is read from `config.toml` in the platform config directory
//! (e.g. `~/.config/todo/config.toml`) or from a file given with `--config`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Priority;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TODO_DATA_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Could not determine a data directory; pass --data-dir or set TODO_DATA_DIR")]
    NoDataDir,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where snapshots are stored (defaults to the platform data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Priority for new tasks when none is given
    pub default_priority: Priority,

    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "todo", "todo-cli")
    }

    /// Returns the default config file location
    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads configuration from `path`, or the default location.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config: {}", config_path.display()))
    }

    /// Parses configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .map_err(Into::into)
    }

    /// Resolves the data directory: flag, then environment, then config,
    /// then the platform default.
    pub fn resolve_data_dir(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = flag {
            return Ok(dir.to_path_buf());
        }

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        Self::project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| ConfigError::NoDataDir.into())
    }
}
