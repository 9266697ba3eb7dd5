//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist before writing files.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Ensure the export directory exists, creating it (and parents) if needed.
pub async fn ensure_dir(dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
    let dir = dir.as_ref();
    if tokio::fs::metadata(dir).await.is_err() {
        debug!(dir = %dir.display(), "creating missing directory");
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    Ok(dir.to_path_buf())
}
