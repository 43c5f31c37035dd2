//! Runtime environment helpers
//!
//! Opens the storage backend and record store the services share.

use std::sync::Arc;

use tracing::info;

use crate::storage::{FileBackend, RecordStore};

/// Open a file-backed record store on `data_dir`, creating the directory if
/// needed. Call [`RecordStore::close`] at shutdown.
pub async fn open_store(data_dir: &str) -> anyhow::Result<Arc<RecordStore>> {
    let backend = FileBackend::open(data_dir).await?;
    common::env::ensure_writable(data_dir).await?;
    info!(%data_dir, "record store opened");
    Ok(RecordStore::new(backend))
}
