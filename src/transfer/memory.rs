use super::{Result, Transfer, TransferError, TransferStream};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::io::Cursor;

/// Transfer session backed by a map of locator -> file contents
#[derive(Debug, Clone, Default)]
pub struct MemoryTransfer {
    files: HashMap<String, Bytes>,
}

impl MemoryTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locator: impl Into<String>, data: impl Into<Bytes>) {
        self.files.insert(locator.into(), data.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryTransfer
where
    K: Into<String>,
    V: Into<Bytes>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl Transfer for MemoryTransfer {
    async fn open(&self, locator: &str) -> Result<TransferStream> {
        // Bytes clones are refcounted, no payload copy here
        let data = self
            .files
            .get(locator)
            .cloned()
            .ok_or_else(|| TransferError::NotFound(locator.to_string()))?;

        Ok(Box::pin(Cursor::new(data)))
    }
}
