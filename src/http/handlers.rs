use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::auth::ProviderSummary;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub auth_dir: String,
    pub providers: Vec<ProviderSummary>,
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        auth_dir: state.auth_dir.display().to_string(),
        providers: state.credentials.summaries().to_vec(),
    })
}

pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": format!("no route for {} {}", method, uri.path()),
        })),
    )
}
