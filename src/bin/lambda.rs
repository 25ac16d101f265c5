//! Serverless entry point.
//!
//! One process serves many invocations. The proxy service is assembled and
//! bootstrapped on the first one; later invocations go straight to it.

use std::sync::Arc;

use lambda_http::{run, Error};

use serverless_proxy::config::LogFormat;
use serverless_proxy::observability::logging;
use serverless_proxy::{EntryPoint, StartupSettings};

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init_logging(LogFormat::Json, logging::DEFAULT_FILTER)?;

    let entry = Arc::new(EntryPoint::new(StartupSettings::from_working_dir()));

    run(entry.router()).await
}
