//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config.toml (optional)
//!     → loader.rs (parse & deserialize, missing file → defaults)
//!     → assembler.rs (append env credentials, patch platform defaults)
//!     → validation.rs (semantic checks, run by the service builder)
//!     → ProxyConfig (consumed once by the builder)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal or absent config files
//! - Environment credentials are appended, never replacing file entries
//! - Validation separates syntactic (serde) from semantic checks

pub mod assembler;
pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use assembler::{ConfigAssembler, DEFAULT_CONFIG_FILE, FALLBACK_AUTH_DIR};
pub use env::{EnvSource, ProcessEnv};
pub use loader::ConfigError;
pub use schema::{LogFormat, ObservabilityConfig, ProviderKey, ProviderKind, ProxyConfig};
