//! Credential subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyConfig api-key lists ─┐
//!                            ├→ CredentialRegistry (read-only after bootstrap)
//! auth dir (*.json records) ─┘
//! ```

pub mod store;

pub use store::{resolve_auth_dir, AuthError, AuthRecord, AuthStore};

use serde::Serialize;

use crate::config::{ProviderKind, ProxyConfig};

/// Per-provider credential counts. Never carries key material.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProviderSummary {
    pub provider: ProviderKind,
    pub api_keys: usize,
    pub auth_files: usize,
}

/// Credentials available to the service, merged from config and auth dir.
#[derive(Debug, Clone)]
pub struct CredentialRegistry {
    summaries: Vec<ProviderSummary>,
}

impl CredentialRegistry {
    pub fn new(config: &ProxyConfig, store: &AuthStore) -> Self {
        let summaries = ProviderKind::ALL
            .into_iter()
            .map(|provider| ProviderSummary {
                provider,
                api_keys: config.credentials(provider).len(),
                auth_files: store.for_provider(provider).count(),
            })
            .collect();

        Self { summaries }
    }

    pub fn summaries(&self) -> &[ProviderSummary] {
        &self.summaries
    }

    /// Total number of usable credentials across providers.
    pub fn total(&self) -> usize {
        self.summaries.iter().map(|s| s.api_keys + s.auth_files).sum()
    }
}
