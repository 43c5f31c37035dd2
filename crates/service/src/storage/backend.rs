use async_trait::async_trait;

use super::record_store::StoreError;

/// Durable home of collection documents.
///
/// Implementations see opaque bytes keyed by collection name. `store` must
/// replace the whole document or leave the previous one untouched.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Raw document for `collection`, or `None` if it was never written.
    async fn load(&self, collection: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn store(&self, collection: &str, document: Vec<u8>) -> Result<(), StoreError>;

    /// Release the backend; later calls fail with [`StoreError::Storage`].
    async fn close(&self) -> Result<(), StoreError>;
}
