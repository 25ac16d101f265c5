//! On-disk authentication state.
//!
//! Each `*.json` file in the auth directory is one record. Files that do
//! not parse are skipped with a warning; only directory-level I/O fails.

use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;

use crate::config::ProviderKind;

/// Errors preparing or reading the auth directory.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to create auth directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read auth directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One persisted authentication record.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AuthRecord {
    /// Provider the record authenticates against.
    #[serde(rename = "type")]
    pub provider: ProviderKind,

    /// Account the record belongs to, when known.
    #[serde(default)]
    pub email: Option<String>,

    /// File the record was loaded from.
    #[serde(skip)]
    pub file_name: String,
}

/// Records loaded from the auth directory.
#[derive(Debug, Clone)]
pub struct AuthStore {
    records: Vec<AuthRecord>,
}

impl AuthStore {
    /// Ensure `dir` exists, then load every record in it.
    pub async fn load(dir: &Path) -> Result<Self, AuthError> {
        fs::create_dir_all(dir)
            .await
            .map_err(|source| AuthError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;

        let read_err = |source: io::Error| AuthError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = fs::read_dir(dir).await.map_err(read_err)?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            let content = match fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(file = %file_name, error = %e, "Skipping unreadable auth file");
                    continue;
                }
            };

            match serde_json::from_str::<AuthRecord>(&content) {
                Ok(mut record) => {
                    record.file_name = file_name;
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!(file = %file_name, error = %e, "Skipping malformed auth file");
                }
            }
        }

        // read_dir order is platform dependent
        records.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        tracing::info!(
            auth_dir = %dir.display(),
            records = records.len(),
            "Auth records loaded"
        );

        Ok(Self { records })
    }

    pub fn records(&self) -> &[AuthRecord] {
        &self.records
    }

    /// Records for one provider.
    pub fn for_provider(&self, provider: ProviderKind) -> impl Iterator<Item = &AuthRecord> {
        self.records.iter().filter(move |r| r.provider == provider)
    }
}

/// Resolve the configured auth directory to a concrete path.
///
/// A leading `~` expands to `home`; relative paths are taken relative to
/// the directory containing the config file.
pub fn resolve_auth_dir(raw: &str, config_path: &Path, home: Option<&str>) -> PathBuf {
    let expanded = match (raw.strip_prefix('~'), home) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            PathBuf::from(format!("{}{}", home.trim_end_matches('/'), rest))
        }
        _ => PathBuf::from(raw),
    };

    if expanded.is_absolute() {
        return expanded;
    }

    let base = config_path
        .parent()
        .filter(|p| p.components().next().is_some())
        .unwrap_or_else(|| Path::new("."));

    // "./foo" and "foo" resolve to the same place
    let relative: PathBuf = expanded
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    base.join(relative)
}
