//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! First request (gate.rs):
//!     get_or_init → startup.rs → publish Arc<ProxyService> or InitError
//!
//! Startup (startup.rs):
//!     Assemble config → Build service → Bootstrap (no listener)
//!
//! Signals (signals.rs, server binary only):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Initialization runs at most once; failure is terminal for the gate
//! - Ordered startup: config first, then build, then bootstrap
//! - Every caller waits for the in-flight attempt instead of racing it

pub mod gate;
pub mod signals;
pub mod startup;

pub use gate::{GateState, InitGate};
pub use startup::{initialize, InitError, StartupSettings};
