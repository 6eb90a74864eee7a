//! Job manifests
//!
//! A manifest lists the files to transfer. Two formats are accepted,
//! chosen by file extension:
//!
//! ```json
//! [{ "id": "id_0", "remote_path": "/remote/file_0.bin" }]
//! ```
//!
//! ```toml
//! [[jobs]]
//! id = "id_0"
//! remote_path = "/remote/file_0.bin"
//! ```

use crate::pipeline::Job;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Duplicate job id '{0}'")]
    DuplicateId(String),

    #[error("Job '{0}' has an empty remote path")]
    EmptyRemotePath(String),
}

#[derive(Debug, Deserialize)]
struct TomlManifest {
    #[serde(default)]
    jobs: Vec<Job>,
}

/// Read and validate a manifest file
pub fn load(path: &Path) -> Result<Vec<Job>, ManifestError> {
    let content = std::fs::read_to_string(path)?;

    let jobs = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => parse_toml(&content)?,
        _ => parse_json(&content)?,
    };

    tracing::debug!(path = %path.display(), jobs = jobs.len(), "Manifest loaded");
    Ok(jobs)
}

pub fn parse_json(content: &str) -> Result<Vec<Job>, ManifestError> {
    let jobs: Vec<Job> = serde_json::from_str(content)?;
    validate(&jobs)?;
    Ok(jobs)
}

pub fn parse_toml(content: &str) -> Result<Vec<Job>, ManifestError> {
    let manifest: TomlManifest = toml::from_str(content)?;
    validate(&manifest.jobs)?;
    Ok(manifest.jobs)
}

/// Job ids double as storage keys, so they must be unique
fn validate(jobs: &[Job]) -> Result<(), ManifestError> {
    let mut seen = HashSet::with_capacity(jobs.len());

    for job in jobs {
        if job.remote_path.trim().is_empty() {
            return Err(ManifestError::EmptyRemotePath(job.id.clone()));
        }
        if !seen.insert(job.id.as_str()) {
            return Err(ManifestError::DuplicateId(job.id.clone()));
        }
    }

    Ok(())
}
