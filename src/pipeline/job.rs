use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One remote file to fetch and process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub remote_path: String,
}

impl Job {
    pub fn new(id: impl Into<String>, remote_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            remote_path: remote_path.into(),
        }
    }
}

/// Payload of a successfully fetched job
#[derive(Debug, Clone)]
pub struct FileResult {
    pub id: String,
    pub data: Bytes,
}
