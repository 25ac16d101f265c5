//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON by default)
//!     → Metrics endpoint (Prometheus scrape, server binary only)
//! ```

pub mod logging;
pub mod metrics;
