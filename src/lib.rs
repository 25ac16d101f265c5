//! Serverless entry adapter for the API proxy service.
//!
//! The first invocation assembles configuration, builds and bootstraps a
//! [`ProxyService`] behind a one-shot gate; every invocation is then
//! delegated to it.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::{EntryPoint, ProxyService, ServiceBuilder};
pub use lifecycle::{InitError, InitGate, StartupSettings};
