//! Object storage sink for processed files
//! Uses Apache Arrow object_store crate

use crate::config::{SinkConfig, SinkProvider};
use crate::pipeline::{FileResult, ProcessError, Processor};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::{ObjectStore, path::Path as StoragePath};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Storage root unavailable: {0}")]
    RootUnavailable(String),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        Self::new(Arc::new(object_store::memory::InMemory::new()))
    }

    /// Store files below `root`, creating it if needed
    pub fn local(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)
            .map_err(|e| StorageError::RootUnavailable(format!("{}: {}", root.display(), e)))?;

        let store = LocalFileSystem::new_with_prefix(root)?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Build the client described by the `[sink]` section
    pub fn from_config(config: &SinkConfig) -> Result<Self> {
        match config.provider {
            SinkProvider::Local => Self::local(&config.root),
            SinkProvider::Memory => Ok(Self::in_memory()),
        }
    }

    /// Upload bytes to storage, replacing any existing object at `key`
    pub async fn upload(&self, key: &str, data: Bytes) -> Result<()> {
        let path = parse_key(key)?;
        let size = data.len();

        let put_result = self.store.put(&path, data.into()).await?;

        tracing::debug!(key, size, etag = ?put_result.e_tag, "Uploaded to storage");

        Ok(())
    }
}

fn parse_key(key: &str) -> Result<StoragePath> {
    StoragePath::parse(key).map_err(|e| StorageError::InvalidKey(format!("{}: {}", key, e)))
}

/// Processor that uploads each fetched file under `<prefix>/<id>`
#[derive(Clone)]
pub struct StorageProcessor {
    storage: StorageClient,
    prefix: String,
}

impl StorageProcessor {
    pub fn new(storage: StorageClient, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    pub fn key_for(&self, id: &str) -> String {
        if self.prefix.is_empty() {
            id.to_string()
        } else {
            format!("{}/{}", self.prefix, id)
        }
    }
}

#[async_trait]
impl Processor for StorageProcessor {
    async fn process(&self, result: FileResult) -> std::result::Result<(), ProcessError> {
        let key = self.key_for(&result.id);
        self.storage.upload(&key, result.data).await?;
        Ok(())
    }
}
