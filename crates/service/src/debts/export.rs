//! Export download helper: writes a backend export to a local file.

use std::path::{Path, PathBuf};

use models::ExportFormat;
use tracing::info;

use super::errors::ActionError;

/// Payload of one export request.
#[derive(Debug, Clone)]
pub enum ExportPayload {
    Csv(Vec<u8>),
    Json(serde_json::Value),
}

impl ExportPayload {
    pub fn format(&self) -> ExportFormat {
        match self {
            ExportPayload::Csv(_) => ExportFormat::Csv,
            ExportPayload::Json(_) => ExportFormat::Json,
        }
    }

    /// File contents: CSV as received, JSON pretty-printed.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ActionError> {
        match self {
            ExportPayload::Csv(bytes) => Ok(bytes.clone()),
            ExportPayload::Json(value) => {
                serde_json::to_vec_pretty(value).map_err(|e| ActionError::Export(e.to_string()))
            }
        }
    }
}

/// Save `payload` as `deudas.csv` / `deudas.json` inside `dir`.
pub async fn save(payload: &ExportPayload, dir: impl AsRef<Path>) -> Result<PathBuf, ActionError> {
    let dir = common::env::ensure_dir(dir).await.map_err(|e| ActionError::Export(e.to_string()))?;
    let path = dir.join(payload.format().file_name());
    let bytes = payload.to_bytes()?;
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| ActionError::Export(format!("cannot write {}: {e}", path.display())))?;
    info!(path = %path.display(), bytes = bytes.len(), "export saved");
    Ok(path)
}
