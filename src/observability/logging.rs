//! Structured logging.
//!
//! `RUST_LOG` always wins over the filter passed in; JSON is the default
//! output because serverless log collectors parse stdout line by line.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter};

use crate::config::LogFormat;

/// Filter used when neither `RUST_LOG` nor the config says otherwise.
pub const DEFAULT_FILTER: &str = "serverless_proxy=info,tower_http=info";

/// Filter directive for a configured log level.
pub fn filter_for_level(level: &str) -> String {
    format!("serverless_proxy={level},tower_http={level}")
}

/// Subscriber for the window before the configured one is installed.
///
/// Scope it with `tracing::subscriber::with_default` so events emitted while
/// the config itself is assembled are not dropped.
pub fn startup_subscriber() -> impl tracing::Subscriber + Send + Sync {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    subscriber_with(filter)
}

fn subscriber_with(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(format: LogFormat, default_filter: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}
