//! The backing proxy service.
//!
//! # Responsibilities
//! - Hold the validated configuration and where it came from
//! - Bootstrap: prepare the auth directory, load auth records, build the
//!   credential registry and the Axum router (no accept loop)
//! - Serve single requests in-process for per-invocation hosting
//! - Run a conventional listener with graceful shutdown

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::{resolve_auth_dir, AuthError, AuthStore, CredentialRegistry};
use crate::config::{EnvSource, ProcessEnv, ProxyConfig};
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};

/// Errors during the bootstrap step.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("service is already bootstrapped")]
    AlreadyBootstrapped,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Errors from the blocking `run` entry point.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialRegistry>,
    pub auth_dir: Arc<PathBuf>,
}

/// Everything bootstrap produces.
struct Runtime {
    router: Router,
    auth_dir: PathBuf,
    credentials: Arc<CredentialRegistry>,
}

/// The proxy service: built by `ServiceBuilder`, then bootstrapped once.
pub struct ProxyService {
    config: Arc<ProxyConfig>,
    config_path: PathBuf,
    runtime: Option<Runtime>,
}

impl ProxyService {
    pub(crate) fn new(config: Arc<ProxyConfig>, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
            runtime: None,
        }
    }

    /// Perform all setup `run` would do, without accepting connections.
    pub async fn bootstrap(&mut self) -> Result<(), BootstrapError> {
        if self.runtime.is_some() {
            return Err(BootstrapError::AlreadyBootstrapped);
        }

        self.runtime = Some(self.prepare().await?);
        Ok(())
    }

    async fn prepare(&self) -> Result<Runtime, BootstrapError> {
        let home = ProcessEnv.var("HOME");
        let auth_dir = resolve_auth_dir(&self.config.auth_dir, &self.config_path, home.as_deref());

        let store = AuthStore::load(&auth_dir).await?;
        let credentials = Arc::new(CredentialRegistry::new(&self.config, &store));

        if credentials.total() == 0 {
            tracing::warn!("No upstream credentials configured");
        }

        let state = AppState {
            credentials: credentials.clone(),
            auth_dir: Arc::new(auth_dir.clone()),
        };

        let router = Self::build_router(&self.config, state);

        tracing::info!(
            config_path = %self.config_path.display(),
            auth_dir = %auth_dir.display(),
            credentials = credentials.total(),
            "Service bootstrapped"
        );

        Ok(Runtime {
            router,
            auth_dir,
            credentials,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/healthz", get(handlers::healthz))
            .route("/v0/status", get(handlers::get_status))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Serve one request in-process.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let Some(runtime) = &self.runtime else {
            tracing::error!(request_id = %request_id(&request), "Request reached service before bootstrap");
            return (StatusCode::SERVICE_UNAVAILABLE, "Service not bootstrapped").into_response();
        };

        if self.config.debug {
            tracing::debug!(
                request_id = %request_id(&request),
                method = %request.method(),
                path = %request.uri().path(),
                "Serving request"
            );
        }

        match runtime.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Bootstrap if needed, then accept connections until `shutdown` fires.
    pub async fn run(
        mut self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServeError> {
        let runtime = match self.runtime.take() {
            Some(runtime) => runtime,
            None => self.prepare().await?,
        };

        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, runtime.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.runtime.is_some()
    }

    /// Resolved auth directory, once bootstrapped.
    pub fn auth_dir(&self) -> Option<&Path> {
        self.runtime.as_ref().map(|r| r.auth_dir.as_path())
    }

    /// Credential registry, once bootstrapped.
    pub fn credentials(&self) -> Option<&CredentialRegistry> {
        self.runtime.as_ref().map(|r| r.credentials.as_ref())
    }
}

impl std::fmt::Debug for ProxyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyService")
            .field("config_path", &self.config_path)
            .field("bootstrapped", &self.is_bootstrapped())
            .finish()
    }
}
