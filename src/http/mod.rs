//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! invocation (lambda_http / axum::serve)
//!     → entry.rs (gate check, delegation or fixed 500)
//!     → server.rs (ProxyService: bootstrapped Axum router)
//!     → request.rs (request ID set + propagate)
//!     → handlers.rs
//! ```

pub mod builder;
pub mod entry;
pub mod handlers;
pub mod request;
pub mod server;

pub use builder::{BuildError, ServiceBuilder};
pub use entry::{init_failed_response, EntryPoint, INIT_FAILED_MESSAGE};
pub use request::X_REQUEST_ID;
pub use server::{BootstrapError, ProxyService, ServeError};
