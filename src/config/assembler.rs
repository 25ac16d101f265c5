//! Runtime configuration assembly.
//!
//! Layers, in order:
//! 1. the on-disk file (optional: a missing file means defaults)
//! 2. environment credentials, appended to the per-provider lists
//! 3. platform defaults for values a read-only deployment cannot rely on

use std::path::PathBuf;

use crate::config::env::EnvSource;
use crate::config::loader::{load_config_optional, ConfigError};
use crate::config::schema::{ProviderKey, ProviderKind, ProxyConfig};

/// Config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Auth-state directory used when none is configured.
pub const FALLBACK_AUTH_DIR: &str = "/tmp/auth";

/// Builds a `ProxyConfig` from file, environment and platform defaults.
#[derive(Debug, Clone)]
pub struct ConfigAssembler {
    path: PathBuf,
    optional: bool,
    fallback_auth_dir: String,
}

impl ConfigAssembler {
    /// Assemble from the file at `path`. The file is optional by default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: true,
            fallback_auth_dir: FALLBACK_AUTH_DIR.to_string(),
        }
    }

    /// Whether a missing config file is tolerated.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Directory used when `auth-dir` is unset.
    pub fn fallback_auth_dir(mut self, dir: impl Into<String>) -> Self {
        self.fallback_auth_dir = dir.into();
        self
    }

    /// Run every layer. Either a complete config or the load error.
    pub fn assemble<E: EnvSource + ?Sized>(&self, env: &E) -> Result<ProxyConfig, ConfigError> {
        let mut config = load_config_optional(&self.path, self.optional)?;

        apply_env_overrides(&mut config, env);
        apply_platform_defaults(&mut config, &self.fallback_auth_dir);

        tracing::info!(
            path = %self.path.display(),
            auth_dir = %config.auth_dir,
            gemini_keys = config.gemini_api_key.len(),
            claude_keys = config.claude_api_key.len(),
            codex_keys = config.codex_api_key.len(),
            "Configuration assembled"
        );

        Ok(config)
    }
}

/// Append one credential per provider whose variable is set and non-empty.
///
/// Entries already in the config are kept; nothing is replaced or
/// deduplicated. A whitespace-only value is skipped, since validation would
/// reject the resulting entry.
pub fn apply_env_overrides<E: EnvSource + ?Sized>(config: &mut ProxyConfig, env: &E) {
    if let Some(port) = env.var("PORT") {
        tracing::debug!(port = %port, "PORT is managed by the hosting platform, ignoring");
    }

    for provider in ProviderKind::ALL {
        let var = provider.env_var();
        match env.var(var) {
            Some(key) if key.trim().is_empty() => {
                if !key.is_empty() {
                    tracing::warn!(provider = %provider, var, "Ignoring blank API key from environment");
                }
            }
            Some(key) => {
                tracing::info!(provider = %provider, var, "Loading API key from environment");
                config.credentials_mut(provider).push(ProviderKey::new(key));
            }
            None => {}
        }
    }
}

/// Patch values the target runtime needs but the file may leave unset.
pub fn apply_platform_defaults(config: &mut ProxyConfig, fallback_auth_dir: &str) {
    if config.auth_dir.is_empty() {
        tracing::debug!(auth_dir = fallback_auth_dir, "auth-dir unset, using fallback");
        config.auth_dir = fallback_auth_dir.to_string();
    }
}
