//! Read-only debt requests. None of them touch the list pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use models::{Debt, DebtSummary, ExportFormat};
use tracing::instrument;

use super::errors::ActionError;
use super::export::{self, ExportPayload};
use super::repository::DebtRepository;

pub struct DebtQueries<R: DebtRepository> {
    repo: Arc<R>,
}

impl<R: DebtRepository> Clone for DebtQueries<R> {
    fn clone(&self) -> Self {
        Self { repo: Arc::clone(&self.repo) }
    }
}

impl<R: DebtRepository> DebtQueries<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn detail(&self, id: &str) -> Result<Debt, ActionError> {
        Ok(self.repo.get(id).await?)
    }

    pub async fn summary(&self) -> Result<DebtSummary, ActionError> {
        Ok(self.repo.summary().await?)
    }

    /// One export request, saved into `dir`. Returns the written file.
    #[instrument(skip(self, format, dir), fields(format = format.as_param()))]
    pub async fn export(&self, format: ExportFormat, dir: impl AsRef<Path>) -> Result<PathBuf, ActionError> {
        let payload = match format {
            ExportFormat::Csv => ExportPayload::Csv(self.repo.export_csv().await?),
            ExportFormat::Json => ExportPayload::Json(self.repo.export_json().await?),
        };
        export::save(&payload, dir).await
    }
}
