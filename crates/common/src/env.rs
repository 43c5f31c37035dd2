//! Environment/runtime helpers
//!
//! Startup checks on the directories the server depends on.

use std::path::Path;

use tracing::{info, warn};

const WRITE_CHECK_FILE: &str = ".write-check";

/// Fail early if `data_dir` is missing or cannot be written to.
pub async fn ensure_writable(data_dir: &str) -> anyhow::Result<()> {
    let meta = tokio::fs::metadata(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot access {data_dir}: {e}"))?;
    if !meta.is_dir() {
        anyhow::bail!("{data_dir} is not a directory");
    }

    let marker = Path::new(data_dir).join(WRITE_CHECK_FILE);
    tokio::fs::write(&marker, b"ok")
        .await
        .map_err(|e| anyhow::anyhow!("{data_dir} is not writable: {e}"))?;
    if let Err(e) = tokio::fs::remove_file(&marker).await {
        warn!(%data_dir, error = %e, "could not remove write check file");
    }
    info!(%data_dir, "data directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("common_env_{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn writable_dir_passes_and_leaves_nothing_behind() -> anyhow::Result<()> {
        let dir = tmp_dir();
        tokio::fs::create_dir_all(&dir).await?;
        ensure_writable(&dir.to_string_lossy()).await?;
        assert!(tokio::fs::metadata(dir.join(WRITE_CHECK_FILE)).await.is_err());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_dir_is_an_error() {
        let dir = tmp_dir();
        assert!(ensure_writable(&dir.to_string_lossy()).await.is_err());
        assert!(tokio::fs::metadata(&dir).await.is_err());
    }
}
