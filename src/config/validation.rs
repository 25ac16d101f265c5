//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject blank credentials and malformed URLs
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs when the service is built, after environment overrides are applied

use thiserror::Error;
use url::Url;

use crate::config::schema::{ProviderKind, ProxyConfig};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{provider} credential #{index} has an empty api-key")]
    EmptyApiKey { provider: ProviderKind, index: usize },

    #[error("{provider} credential #{index} has an invalid {field}: {value}")]
    InvalidUrl {
        provider: ProviderKind,
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("timeouts.request-secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for provider in ProviderKind::ALL {
        for (index, key) in config.credentials(provider).iter().enumerate() {
            if key.api_key.trim().is_empty() {
                errors.push(ValidationError::EmptyApiKey { provider, index });
            }

            let urls = [("base-url", &key.base_url), ("proxy-url", &key.proxy_url)];
            for (field, value) in urls {
                if let Some(value) = value {
                    if Url::parse(value).is_err() {
                        errors.push(ValidationError::InvalidUrl {
                            provider,
                            index,
                            field,
                            value: value.clone(),
                        });
                    }
                }
            }
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ProviderKey;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ProxyConfig::default();
        config.gemini_api_key.push(ProviderKey::new("   "));
        config.codex_api_key.push(ProviderKey {
            api_key: "sk-ok".into(),
            base_url: Some("not a url".into()),
            proxy_url: Some("socks5://127.0.0.1:1080".into()),
        });
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyApiKey {
                    provider: ProviderKind::Gemini,
                    index: 0
                },
                ValidationError::InvalidUrl {
                    provider: ProviderKind::Codex,
                    index: 0,
                    field: "base-url",
                    value: "not a url".into(),
                },
                ValidationError::ZeroRequestTimeout,
            ]
        );
    }
}
