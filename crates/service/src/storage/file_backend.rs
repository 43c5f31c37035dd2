use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

use super::backend::StorageBackend;
use super::record_store::StoreError;

const TMP_SUFFIX: &str = ".tmp";

/// One JSON document per collection under a data directory.
///
/// Writes go to `<name>.json.<uuid>.tmp`, are fsynced, then renamed over
/// `<name>.json`, so a reader or a crash only ever sees a complete document.
pub struct FileBackend {
    dir: PathBuf,
    closed: AtomicBool,
}

impl FileBackend {
    /// Open (and create if needed) the data directory. Temp files left behind
    /// by an interrupted write are removed; they never hold committed state.
    pub async fn open<P: Into<PathBuf>>(dir: P) -> Result<Arc<Self>, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::storage(format!("cannot create {}: {e}", dir.display())))?;
        remove_stale_temp_files(&dir).await;
        debug!(dir = %dir.display(), "file backend opened");
        Ok(Arc::new(Self { dir, closed: AtomicBool::new(false) }))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Document path for a collection. Names are a fixed set chosen by the
    /// code, but anything that could escape the data directory is refused.
    pub fn path_for(&self, collection: &str) -> Result<PathBuf, StoreError> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::storage(format!("invalid collection name {collection:?}")));
        }
        Ok(self.dir.join(format!("{collection}.json")))
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::storage("file backend is closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn load(&self, collection: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.ensure_open()?;
        let path = self.path_for(collection)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::storage(format!("cannot read {}: {e}", path.display()))),
        }
    }

    async fn store(&self, collection: &str, document: Vec<u8>) -> Result<(), StoreError> {
        self.ensure_open()?;
        let path = self.path_for(collection)?;
        let tmp = self
            .dir
            .join(format!("{collection}.json.{}{TMP_SUFFIX}", Uuid::new_v4().simple()));

        if let Err(e) = write_synced(&tmp, &document).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::storage(format!("cannot write {}: {e}", tmp.display())));
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::storage(format!("cannot replace {}: {e}", path.display())));
        }
        sync_dir(&self.dir).await;
        debug!(collection, bytes = document.len(), "collection document replaced");
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        debug!(dir = %self.dir.display(), "file backend closed");
        Ok(())
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

/// Persist the rename itself. Not every platform lets a directory be opened
/// for syncing, so failures are only logged.
async fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    {
        match fs::File::open(dir).await {
            Ok(d) => {
                if let Err(e) = d.sync_all().await {
                    debug!(dir = %dir.display(), error = %e, "directory sync failed");
                }
            }
            Err(e) => debug!(dir = %dir.display(), error = %e, "directory open for sync failed"),
        }
    }
    #[cfg(not(unix))]
    let _ = dir;
}

async fn remove_stale_temp_files(dir: &Path) {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot scan data directory for temp files");
            return;
        }
    };
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "data directory scan stopped early");
                break;
            }
        };
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.contains(".json.") && name.ends_with(TMP_SUFFIX) {
            warn!(file = %name, "removing temp file from interrupted write");
            if let Err(e) = fs::remove_file(entry.path()).await {
                warn!(file = %name, error = %e, "cannot remove temp file");
            }
        }
    }
}
