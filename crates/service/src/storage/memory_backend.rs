use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::StorageBackend;
use super::record_store::StoreError;

/// Keeps documents in process memory. Used by tests and throwaway runs.
#[derive(Default)]
pub struct MemoryBackend {
    documents: RwLock<HashMap<String, Vec<u8>>>,
    closed: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed a raw document, bypassing the record store.
    pub async fn insert_raw(&self, collection: &str, document: impl Into<Vec<u8>>) {
        self.documents.write().await.insert(collection.to_string(), document.into());
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::storage("memory backend is closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn load(&self, collection: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.ensure_open()?;
        Ok(self.documents.read().await.get(collection).cloned())
    }

    async fn store(&self, collection: &str, document: Vec<u8>) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.documents.write().await.insert(collection.to_string(), document);
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
