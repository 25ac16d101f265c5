//! Startup orchestration.
//!
//! # Responsibilities
//! - Assemble configuration (file, environment, platform defaults)
//! - Build the service from it
//! - Bootstrap the service without starting a listener
//!
//! # Design Decisions
//! - Fail fast: any step failing aborts the whole sequence
//! - No partial success: either a bootstrapped service or an `InitError`

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{ConfigAssembler, ConfigError, EnvSource, DEFAULT_CONFIG_FILE, FALLBACK_AUTH_DIR};
use crate::http::builder::{BuildError, ServiceBuilder};
use crate::http::server::{BootstrapError, ProxyService};

/// Why the service could not be brought up.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build service: {0}")]
    Build(#[from] BuildError),

    #[error("failed to bootstrap service: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("initialization panicked: {0}")]
    Panicked(String),
}

/// Where and how to source the runtime configuration.
#[derive(Debug, Clone)]
pub struct StartupSettings {
    /// Config file location.
    pub config_path: PathBuf,

    /// Tolerate a missing config file.
    pub optional: bool,

    /// Auth-state directory used when the config leaves it unset.
    pub fallback_auth_dir: String,
}

impl StartupSettings {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            optional: true,
            fallback_auth_dir: FALLBACK_AUTH_DIR.to_string(),
        }
    }

    /// `config.toml` in the process working directory.
    pub fn from_working_dir() -> Self {
        let dir = std::env::current_dir().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Cannot determine working directory, using relative config path");
            PathBuf::new()
        });
        Self::new(dir.join(DEFAULT_CONFIG_FILE))
    }

    pub fn assembler(&self) -> ConfigAssembler {
        ConfigAssembler::new(&self.config_path)
            .optional(self.optional)
            .fallback_auth_dir(&self.fallback_auth_dir)
    }
}

/// Assemble, build and bootstrap the service.
pub async fn initialize<E>(settings: &StartupSettings, env: &E) -> Result<ProxyService, InitError>
where
    E: EnvSource + Sync + ?Sized,
{
    let config = settings.assembler().assemble(env)?;

    let mut service = ServiceBuilder::new()
        .with_config(config)
        .with_config_path(&settings.config_path)
        .build()?;

    service.bootstrap().await?;
    Ok(service)
}
