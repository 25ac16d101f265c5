//! Configuration schema definitions.
//!
//! This module defines the complete runtime configuration for the proxy
//! service. All types derive Serde traits for deserialization from the
//! TOML config file; keys are kebab-case.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root runtime configuration for the proxy service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// Listening port for the conventional server deployment.
    ///
    /// The serverless entry never binds; the hosting platform owns the port.
    pub port: u16,

    /// Directory holding persisted authentication state.
    ///
    /// Empty means "not configured"; the assembler patches in a fallback.
    pub auth_dir: String,

    /// Verbose request logging.
    pub debug: bool,

    /// Gemini API credentials.
    pub gemini_api_key: Vec<ProviderKey>,

    /// Claude API credentials.
    pub claude_api_key: Vec<ProviderKey>,

    /// OpenAI / Codex API credentials.
    pub codex_api_key: Vec<ProviderKey>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: 8317,
            auth_dir: String::new(),
            debug: false,
            gemini_api_key: Vec::new(),
            claude_api_key: Vec::new(),
            codex_api_key: Vec::new(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Credential list for the given provider.
    pub fn credentials(&self, kind: ProviderKind) -> &[ProviderKey] {
        match kind {
            ProviderKind::Gemini => &self.gemini_api_key,
            ProviderKind::Claude => &self.claude_api_key,
            ProviderKind::Codex => &self.codex_api_key,
        }
    }

    /// Mutable credential list for the given provider.
    pub fn credentials_mut(&mut self, kind: ProviderKind) -> &mut Vec<ProviderKey> {
        match kind {
            ProviderKind::Gemini => &mut self.gemini_api_key,
            ProviderKind::Claude => &mut self.claude_api_key,
            ProviderKind::Codex => &mut self.codex_api_key,
        }
    }
}

/// Upstream provider families the proxy holds credentials for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Claude,
    Codex,
}

impl ProviderKind {
    /// All providers, in the order their environment variables are read.
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Gemini,
        ProviderKind::Claude,
        ProviderKind::Codex,
    ];

    /// Environment variable that carries an API key for this provider.
    pub fn env_var(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Claude => "CLAUDE_API_KEY",
            ProviderKind::Codex => "OPENAI_API_KEY",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Claude => "claude",
            ProviderKind::Codex => "codex",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single API credential for an upstream provider.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderKey {
    /// The API key itself.
    pub api_key: String,

    /// Override for the provider's base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Outbound proxy used for this credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

impl ProviderKey {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            proxy_url: None,
        }
    }
}

// Keys must never end up in logs.
impl fmt::Debug for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderKey")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("proxy_url", &self.proxy_url)
            .finish()
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_case_file() {
        let raw = r#"
            port = 9000
            auth-dir = "~/.proxy-auth"

            [[claude-api-key]]
            api-key = "sk-file"
            base-url = "https://claude.example.com"

            [timeouts]
            request-secs = 5
        "#;

        let config: ProxyConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.auth_dir, "~/.proxy-auth");
        assert_eq!(config.claude_api_key.len(), 1);
        assert_eq!(config.claude_api_key[0].api_key, "sk-file");
        assert_eq!(
            config.claude_api_key[0].base_url.as_deref(),
            Some("https://claude.example.com")
        );
        assert!(config.gemini_api_key.is_empty());
        assert_eq!(config.timeouts.request_secs, 5);
        assert_eq!(config.observability, ObservabilityConfig::default());
    }

    #[test]
    fn debug_output_redacts_keys() {
        let key = ProviderKey::new("super-secret");
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn env_vars_cover_every_provider() {
        let vars: Vec<_> = ProviderKind::ALL.iter().map(|k| k.env_var()).collect();
        assert_eq!(vars, ["GEMINI_API_KEY", "CLAUDE_API_KEY", "OPENAI_API_KEY"]);
    }
}
