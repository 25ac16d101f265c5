//! Staged construction of the proxy service.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::validation::{validate_config, ValidationError};
use crate::config::{ProxyConfig, DEFAULT_CONFIG_FILE};
use crate::http::server::ProxyService;

/// Errors rejecting a service build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no configuration attached to the builder")]
    MissingConfig,

    #[error("invalid configuration: {}", join(.0))]
    Invalid(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builder for [`ProxyService`].
///
/// ```ignore
/// let service = ServiceBuilder::new()
///     .with_config(config)
///     .with_config_path("config.toml")
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct ServiceBuilder {
    config: Option<ProxyConfig>,
    config_path: Option<PathBuf>,
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the runtime configuration.
    pub fn with_config(mut self, config: ProxyConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Attach the path the configuration was sourced from.
    ///
    /// Relative paths inside the configuration resolve against its parent.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Validate the configuration and construct an unbootstrapped service.
    pub fn build(self) -> Result<ProxyService, BuildError> {
        let config = self.config.ok_or(BuildError::MissingConfig)?;
        validate_config(&config).map_err(BuildError::Invalid)?;

        let config_path = self
            .config_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        Ok(ProxyService::new(Arc::new(config), config_path))
    }
}
