//! Remote file transfer capability
//!
//! The pipeline only ever asks a transfer session for one thing: open a
//! locator and hand back a readable byte stream. Backends:
//!
//! - [`MemoryTransfer`] - in-memory store, used for tests and benchmarks
//! - [`ObjectStoreTransfer`] - streams objects out of any `object_store` backend

mod memory;
mod remote;

pub use memory::MemoryTransfer;
pub use remote::ObjectStoreTransfer;

use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Remote unreachable: {0}")]
    Unreachable(String),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),
}

pub type Result<T> = std::result::Result<T, TransferError>;

/// Readable handle returned by [`Transfer::open`]. Dropping it releases the
/// underlying remote handle.
pub type TransferStream = Pin<Box<dyn AsyncRead + Send>>;

/// An open file-transfer session
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Open `locator` for reading
    async fn open(&self, locator: &str) -> Result<TransferStream>;
}
