//! One-shot initialization gate.
//!
//! Runs an expensive build-and-bootstrap action at most once and publishes
//! its outcome to every caller. The action runs on its own task, so a caller
//! dropped mid-attempt (a client disconnect, a timed-out invocation) does not
//! cancel it. Later callers join the same attempt; nobody re-runs it.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;

use crate::lifecycle::startup::InitError;
use crate::observability::metrics;

/// Observable state of an [`InitGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No attempt has started.
    Uninitialized,
    /// An attempt started but nothing is published yet.
    Initializing,
    /// The value is published.
    Ready,
    /// The attempt failed. Terminal for the lifetime of the gate.
    Failed,
}

/// Completion of the spawned attempt. `Some` carries the reason when the task
/// ended without publishing.
type Attempt = Shared<BoxFuture<'static, Option<String>>>;

/// A get-or-init cell whose action runs at most once.
///
/// Failures are published like successes and never retried.
pub struct InitGate<T> {
    outcome: Arc<OnceLock<Result<Arc<T>, InitError>>>,
    attempt: OnceLock<Attempt>,
    attempts: AtomicUsize,
}

impl<T> InitGate<T> {
    pub fn new() -> Self {
        Self {
            outcome: Arc::new(OnceLock::new()),
            attempt: OnceLock::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    /// The published value, if initialization succeeded.
    pub fn get(&self) -> Option<&Arc<T>> {
        self.outcome.get().and_then(|r| r.as_ref().ok())
    }

    /// The published failure, if initialization failed.
    pub fn failure(&self) -> Option<&InitError> {
        self.outcome.get().and_then(|r| r.as_ref().err())
    }

    pub fn state(&self) -> GateState {
        match self.outcome.get() {
            Some(Ok(_)) => GateState::Ready,
            Some(Err(_)) => GateState::Failed,
            None if self.attempts() > 0 => GateState::Initializing,
            None => GateState::Uninitialized,
        }
    }

    /// Number of times the init action has started.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl<T: Send + Sync + 'static> InitGate<T> {
    /// Return the published outcome, starting `init` first if no attempt
    /// exists yet.
    ///
    /// A panic inside `init` is caught and published as
    /// [`InitError::Panicked`]. Must be called from within a Tokio runtime.
    pub async fn get_or_init<F, Fut>(&self, init: F) -> Result<&Arc<T>, &InitError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, InitError>> + Send + 'static,
    {
        if let Some(outcome) = self.outcome.get() {
            return outcome.as_ref();
        }

        let attempt = self.attempt.get_or_init(|| self.launch(init())).clone();
        let lost = attempt.await;

        self.outcome
            .get_or_init(|| {
                let reason = lost.unwrap_or_else(|| "initialization task ended without an outcome".to_string());
                tracing::error!(error = %reason, "Initialization task did not complete");
                metrics::record_init("failure", Instant::now());
                Err(InitError::Panicked(reason))
            })
            .as_ref()
    }

    fn launch<Fut>(&self, init: Fut) -> Attempt
    where
        Fut: Future<Output = Result<T, InitError>> + Send + 'static,
    {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self.outcome.clone();

        let task = tokio::spawn(async move {
            let started = Instant::now();
            tracing::info!(attempt, "Initializing service");

            let result = match AssertUnwindSafe(init).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => Err(InitError::Panicked(panic_message(panic.as_ref()))),
            };

            match &result {
                Ok(_) => {
                    tracing::info!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Service initialized"
                    );
                    metrics::record_init("success", started);
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Service initialization failed, requests will be rejected"
                    );
                    metrics::record_init("failure", started);
                }
            }

            let _ = outcome.set(result.map(Arc::new));
        });

        async move {
            match task.await {
                Ok(()) => None,
                Err(e) if e.is_panic() => Some(panic_message(e.into_panic().as_ref())),
                Err(e) => Some(e.to_string()),
            }
        }
        .boxed()
        .shared()
    }
}

impl<T> Default for InitGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for InitGate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitGate")
            .field("state", &self.state())
            .field("attempts", &self.attempts())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
