//! Configuration for the palette host.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::messages::OverrideCatalog;

pub const DEFAULT_SQLITE_PATH: &str = ".taskpal/tasks.sqlite";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PaletteConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Message overrides keyed by message tag, e.g. `task_deleted`.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
}

impl PaletteConfig {
    pub fn catalog(&self) -> OverrideCatalog {
        OverrideCatalog::from_entries(&self.messages)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub sqlite_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from(DEFAULT_SQLITE_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

pub fn parse_palette_config(contents: &str) -> Result<PaletteConfig, toml::de::Error> {
    toml::from_str(contents)
}

pub fn load_palette_config(path: impl AsRef<Path>) -> Result<PaletteConfig, ConfigError> {
    let path_ref = path.as_ref();
    let body = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
        path: path_ref.to_path_buf(),
        source,
    })?;
    parse_palette_config(&body).map_err(|source| ConfigError::Parse {
        path: path_ref.to_path_buf(),
        source,
    })
}

/// Load the config at `path`, or the defaults when the file does not exist.
pub fn load_palette_config_or_default(
    path: impl AsRef<Path>,
) -> Result<PaletteConfig, ConfigError> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Ok(PaletteConfig::default());
    }
    load_palette_config(path_ref)
}
