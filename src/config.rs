//! User configuration, read from `config.toml`.

use crate::calculator::{DisplayOptions, MAX_DECIMALS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub thousands_separators: bool,
    pub max_decimals: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Print the history view again whenever it changes.
    pub echo: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let options = DisplayOptions::default();
        Self {
            thousands_separators: options.thousands_separators,
            max_decimals: options.max_decimals,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { echo: true }
    }
}

impl Config {
    /// Default location: `<config dir>/tally/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tally")
            .join("config.toml")
    }

    /// Load from `path`, falling back to defaults when the file is missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Write the config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        fs::write(path, self.to_toml()?).map_err(write_err)
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            thousands_separators: self.display.thousands_separators,
            max_decimals: self.display.max_decimals.min(MAX_DECIMALS),
        }
    }
}
