//! Transfer session over Apache Arrow's object_store crate
//!
//! Works against any `ObjectStore` backend (local filesystem, in-memory,
//! or a cloud store configured by the caller). Objects are streamed, not
//! buffered, so the fetch worker controls how the payload is read.

use super::{Result, Transfer, TransferError, TransferStream};
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::local::LocalFileSystem;
use object_store::{ObjectStore, path::Path as StoragePath};
use std::path::Path;
use std::sync::Arc;
use tokio_util::io::StreamReader;

/// Transfer session reading from an object store
#[derive(Clone)]
pub struct ObjectStoreTransfer {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreTransfer {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Serve files below `root` on the local filesystem
    pub fn local(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let store = LocalFileSystem::new_with_prefix(root).map_err(|e| {
            TransferError::Unreachable(format!("{}: {}", root.display(), e))
        })?;

        Ok(Self::new(Arc::new(store)))
    }
}

impl std::fmt::Debug for ObjectStoreTransfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreTransfer")
            .field("store", &self.store.to_string())
            .finish()
    }
}

/// Object store paths have no leading delimiter; remote paths usually do.
fn to_storage_path(locator: &str) -> Result<StoragePath> {
    let trimmed = locator.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(TransferError::InvalidLocator(locator.to_string()));
    }

    StoragePath::parse(trimmed)
        .map_err(|e| TransferError::InvalidLocator(format!("{}: {}", locator, e)))
}

fn map_store_error(locator: &str, err: object_store::Error) -> TransferError {
    match err {
        object_store::Error::NotFound { .. } => TransferError::NotFound(locator.to_string()),
        object_store::Error::PermissionDenied { .. }
        | object_store::Error::Unauthenticated { .. } => {
            TransferError::PermissionDenied(locator.to_string())
        }
        other => TransferError::Unreachable(format!("{}: {}", locator, other)),
    }
}

#[async_trait]
impl Transfer for ObjectStoreTransfer {
    async fn open(&self, locator: &str) -> Result<TransferStream> {
        let path = to_storage_path(locator)?;

        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| map_store_error(locator, e))?;

        tracing::trace!(locator, size = result.meta.size, "Opened remote object");

        let stream = result
            .into_stream()
            .map_err(std::io::Error::other);

        Ok(Box::pin(StreamReader::new(stream)))
    }
}
