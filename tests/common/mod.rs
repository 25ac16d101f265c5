//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use serverless_proxy::config::DEFAULT_CONFIG_FILE;
use serverless_proxy::StartupSettings;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Startup settings rooted in `dir`, with the auth fallback inside it too.
#[allow(dead_code)]
pub fn settings_in(dir: &Path) -> StartupSettings {
    let mut settings = StartupSettings::new(dir.join(DEFAULT_CONFIG_FILE));
    settings.fallback_auth_dir = dir.join("auth").display().to_string();
    settings
}

/// Write `contents` as the config file in `dir`.
#[allow(dead_code)]
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join(DEFAULT_CONFIG_FILE);
    std::fs::write(&path, contents).unwrap();
    path
}

#[allow(dead_code)]
pub fn env(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
    pairs.iter().copied().collect()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Minimal HTTP/1.1 GET over a raw socket. Returns the full response text.
#[allow(dead_code)]
pub async fn raw_get(addr: SocketAddr, path: &str) -> String {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    socket.read_to_string(&mut response).await.unwrap();
    response
}
