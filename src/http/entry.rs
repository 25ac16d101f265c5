//! Per-invocation request entry.
//!
//! # Data Flow
//! ```text
//! invocation
//!     → EntryPoint::handle
//!     → InitGate::get_or_init (first call only: assemble → build → bootstrap)
//!     → ProxyService::serve          (service published)
//!     → 500 "Service initialization failed"   (initialization failed)
//! ```
//!
//! The entry point owns the gate; there is no process-global state. Wrap it
//! in an `Arc` and hand `router()` to the hosting runtime.

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::config::ProcessEnv;
use crate::http::request::request_id;
use crate::http::server::ProxyService;
use crate::lifecycle::gate::InitGate;
use crate::lifecycle::startup::{initialize, InitError, StartupSettings};
use crate::observability::metrics;

/// Body of the response sent when no service could be initialized.
pub const INIT_FAILED_MESSAGE: &str = "Service initialization failed";

type Initializer = Arc<dyn Fn() -> BoxFuture<'static, Result<ProxyService, InitError>> + Send + Sync>;

/// Request-handling context: the initialization gate plus how to fill it.
pub struct EntryPoint {
    gate: InitGate<ProxyService>,
    init: Initializer,
}

impl EntryPoint {
    /// Initialize from `settings` and the process environment.
    pub fn new(settings: StartupSettings) -> Self {
        let settings = Arc::new(settings);
        Self::with_initializer(move || {
            let settings = settings.clone();
            async move { initialize(&settings, &ProcessEnv).await }
        })
    }

    /// Initialize with a custom action instead of the default sequence.
    pub fn with_initializer<F, Fut>(init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ProxyService, InitError>> + Send + 'static,
    {
        Self {
            gate: InitGate::new(),
            init: Arc::new(move || init().boxed()),
        }
    }

    /// Serve one invocation.
    ///
    /// The first call runs initialization; every later call reuses the
    /// published outcome. A failed initialization is never retried here.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        match self.gate.get_or_init(|| (self.init)()).await {
            Ok(service) => {
                metrics::record_request("delegated");
                service.serve(request).await
            }
            Err(_) => {
                tracing::warn!(
                    request_id = %request_id(&request),
                    path = %request.uri().path(),
                    "Rejecting request, service unavailable"
                );
                metrics::record_request("unavailable");
                init_failed_response()
            }
        }
    }

    pub fn gate(&self) -> &InitGate<ProxyService> {
        &self.gate
    }

    /// A router sending every request through [`EntryPoint::handle`].
    pub fn router(self: Arc<Self>) -> Router {
        Router::new().fallback(entry_handler).with_state(self)
    }
}

impl std::fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPoint").field("gate", &self.gate).finish()
    }
}

async fn entry_handler(State(entry): State<Arc<EntryPoint>>, request: Request<Body>) -> Response {
    entry.handle(request).await
}

/// The fixed response for requests that find no service.
pub fn init_failed_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, INIT_FAILED_MESSAGE).into_response()
}
