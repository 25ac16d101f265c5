//! Configuration loading from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// True when the file simply does not exist.
    pub fn is_missing(&self) -> bool {
        matches!(self, ConfigError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration, tolerating a missing file when `optional` is set.
///
/// A missing optional file yields `ProxyConfig::default()`. Any other
/// failure (unreadable, malformed) is returned as-is.
pub fn load_config_optional(path: &Path, optional: bool) -> Result<ProxyConfig, ConfigError> {
    match load_config(path) {
        Ok(config) => Ok(config),
        Err(e) if optional && e.is_missing() => {
            tracing::info!(path = %path.display(), "No config file found, using defaults");
            Ok(ProxyConfig::default())
        }
        Err(e) => Err(e),
    }
}
