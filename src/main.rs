//! Conventional, filesystem-backed deployment of the proxy service.
//!
//! ```text
//! config.toml + environment
//!     → ConfigAssembler
//!     → ServiceBuilder
//!     → ProxyService::run (bootstrap, then accept loop until SIGINT/SIGTERM)
//! ```
//!
//! The serverless deployment lives in `src/bin/lambda.rs` and shares every
//! step except the accept loop.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use serverless_proxy::config::ProcessEnv;
use serverless_proxy::lifecycle::{signals, StartupSettings};
use serverless_proxy::observability::{logging, metrics};
use serverless_proxy::ServiceBuilder;

#[derive(Parser)]
#[command(name = "serverless-proxy")]
#[command(about = "API proxy service with layered file/environment configuration", long_about = None)]
struct Cli {
    /// Config file (defaults to config.toml in the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail instead of using defaults when the config file is missing
    #[arg(long)]
    require_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = match cli.config {
        Some(path) => StartupSettings::new(path),
        None => StartupSettings::from_working_dir(),
    };
    settings.optional = !cli.require_config;

    let assembler = settings.assembler();
    let config = tracing::subscriber::with_default(logging::startup_subscriber(), || {
        assembler.assemble(&ProcessEnv)
    })?;

    logging::init_logging(
        config.observability.log_format,
        &logging::filter_for_level(&config.observability.log_level),
    )?;

    tracing::info!("serverless-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_path = %settings.config_path.display(),
        port = config.port,
        auth_dir = %config.auth_dir,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;

    let service = ServiceBuilder::new()
        .with_config(config)
        .with_config_path(&settings.config_path)
        .build()?;

    service.run(listener, signals::shutdown_on_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
