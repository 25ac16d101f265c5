//! End-to-end tests of the serverless entry: gate, assembly and delegation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::Value;
use serverless_proxy::http::{EntryPoint, ProxyService, INIT_FAILED_MESSAGE, X_REQUEST_ID};
use serverless_proxy::lifecycle::{initialize, GateState, InitError, StartupSettings};
use tower::ServiceExt;

mod common;

/// An entry point that counts how often its initializer runs.
fn counting_entry(
    settings: StartupSettings,
    env: HashMap<&'static str, &'static str>,
) -> (Arc<EntryPoint>, Arc<AtomicU32>) {
    let runs = Arc::new(AtomicU32::new(0));
    let counter = runs.clone();
    let settings = Arc::new(settings);
    let env = Arc::new(env);

    let entry = EntryPoint::with_initializer(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let settings = settings.clone();
        let env = env.clone();
        async move { initialize(&settings, env.as_ref()).await }
    });

    (Arc::new(entry), runs)
}

async fn status_json(entry: &EntryPoint) -> Value {
    let response = entry.handle(common::get("/v0/status")).await;
    assert_eq!(response.status(), StatusCode::OK);
    serde_json::from_str(&common::body_string(response).await).unwrap()
}

fn provider<'a>(status: &'a Value, name: &str) -> &'a Value {
    status["providers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["provider"] == name)
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_invocations_initialize_once() {
    let dir = tempfile::tempdir().unwrap();
    let (entry, runs) = counting_entry(common::settings_in(dir.path()), common::env(&[]));

    let mut handles = Vec::new();
    for _ in 0..64 {
        let router = entry.clone().router();
        handles.push(tokio::spawn(async move {
            router.oneshot(common::get("/healthz")).await.unwrap()
        }));
    }

    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(common::body_string(response).await, "ok");
    }

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(entry.gate().attempts(), 1);
    assert_eq!(entry.gate().state(), GateState::Ready);
}

#[tokio::test]
async fn later_invocations_reuse_the_published_service() {
    let dir = tempfile::tempdir().unwrap();
    let (entry, runs) = counting_entry(common::settings_in(dir.path()), common::env(&[]));

    let first = entry.handle(common::get("/healthz")).await;
    assert_eq!(first.status(), StatusCode::OK);
    let published = entry.gate().get().unwrap().clone();

    for _ in 0..5 {
        let response = entry.handle(common::get("/healthz")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&published, entry.gate().get().unwrap()));
}

#[tokio::test]
async fn env_key_without_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let (entry, _) = counting_entry(
        common::settings_in(dir.path()),
        common::env(&[("GEMINI_API_KEY", "abc")]),
    );

    let status = status_json(&entry).await;
    assert_eq!(provider(&status, "gemini")["api_keys"], 1);
    assert_eq!(provider(&status, "claude")["api_keys"], 0);
    assert_eq!(provider(&status, "codex")["api_keys"], 0);

    let service = entry.gate().get().unwrap();
    assert_eq!(service.config().gemini_api_key[0].api_key, "abc");
    assert_eq!(service.auth_dir(), Some(dir.path().join("auth").as_path()));
}

#[tokio::test]
async fn env_key_is_appended_to_file_keys() {
    let dir = tempfile::tempdir().unwrap();
    common::write_config(
        dir.path(),
        r#"
            [[claude-api-key]]
            api-key = "from-file"
        "#,
    );
    let (entry, _) = counting_entry(
        common::settings_in(dir.path()),
        common::env(&[("CLAUDE_API_KEY", "xyz")]),
    );

    let status = status_json(&entry).await;
    assert_eq!(provider(&status, "claude")["api_keys"], 2);

    let service = entry.gate().get().unwrap();
    let keys: Vec<_> = service
        .config()
        .claude_api_key
        .iter()
        .map(|k| k.api_key.as_str())
        .collect();
    assert_eq!(keys, ["from-file", "xyz"]);
}

#[tokio::test]
async fn auth_records_are_loaded_relative_to_config() {
    let dir = tempfile::tempdir().unwrap();
    common::write_config(dir.path(), "auth-dir = \"./state\"\n");
    std::fs::create_dir_all(dir.path().join("state")).unwrap();
    std::fs::write(
        dir.path().join("state").join("codex-ops.json"),
        r#"{"type": "codex", "email": "ops@example.com"}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("state").join("junk.json"), "[").unwrap();

    let (entry, _) = counting_entry(common::settings_in(dir.path()), common::env(&[]));

    let status = status_json(&entry).await;
    assert_eq!(provider(&status, "codex")["auth_files"], 1);
    assert_eq!(provider(&status, "gemini")["auth_files"], 0);
    assert!(!status.to_string().contains("ops@example.com"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn config_failure_rejects_every_request() {
    let dir = tempfile::tempdir().unwrap();
    common::write_config(dir.path(), "port = [unterminated");
    let (entry, runs) = counting_entry(
        common::settings_in(dir.path()),
        common::env(&[("GEMINI_API_KEY", "abc")]),
    );

    let mut handles = Vec::new();
    for _ in 0..16 {
        let entry = entry.clone();
        handles.push(tokio::spawn(async move {
            entry.handle(common::get("/healthz")).await
        }));
    }
    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(common::body_string(response).await, INIT_FAILED_MESSAGE);
    }

    // fixing the file does not help: failure is terminal for this process
    common::write_config(dir.path(), "");
    let response = entry.handle(common::get("/healthz")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(entry.gate().state(), GateState::Failed);
    assert!(entry.gate().get().is_none());
}

#[tokio::test]
async fn default_entry_reports_malformed_config() {
    let dir = tempfile::tempdir().unwrap();
    common::write_config(dir.path(), "[[gemini-api-key]]\napi-key = 42\n");
    let entry = EntryPoint::new(common::settings_in(dir.path()));

    let response = entry.handle(common::get("/")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(common::body_string(response).await, INIT_FAILED_MESSAGE);
    assert_eq!(entry.gate().state(), GateState::Failed);
}

async fn crash() -> Result<ProxyService, InitError> {
    panic!("auth manager crashed")
}

#[tokio::test]
async fn panicking_initializer_is_not_retried() {
    let runs = Arc::new(AtomicU32::new(0));
    let counter = runs.clone();
    let entry = EntryPoint::with_initializer(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        crash()
    });

    for _ in 0..3 {
        let response = entry.handle(common::get("/healthz")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(entry.gate().state(), GateState::Failed);
}

#[tokio::test]
async fn responses_carry_request_ids() {
    let dir = tempfile::tempdir().unwrap();
    let (entry, _) = counting_entry(common::settings_in(dir.path()), common::env(&[]));

    let response = entry.handle(common::get("/healthz")).await;
    let generated = response.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    let mut request = common::get("/healthz");
    request
        .headers_mut()
        .insert(X_REQUEST_ID, "caller-supplied".parse().unwrap());
    let response = entry.handle(request).await;
    assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), "caller-supplied");
}

#[tokio::test]
async fn unknown_paths_are_answered_by_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let (entry, _) = counting_entry(common::settings_in(dir.path()), common::env(&[]));

    let response = entry.handle(common::get("/v1/unknown")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = serde_json::from_str(&common::body_string(response).await).unwrap();
    assert_eq!(body["error"], "no route for GET /v1/unknown");
}
