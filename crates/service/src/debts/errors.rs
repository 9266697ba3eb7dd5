use client::ApiError;
use thiserror::Error;

use crate::validators::ValidationError;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("debt {0} is already paid and can no longer be changed")]
    AlreadyPaid(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("export failed: {0}")]
    Export(String),
}

impl ActionError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ActionError::AlreadyPaid(_) => 2001,
            ActionError::Validation(_) => 2002,
            ActionError::Api(e) if e.status() == Some(404) => 2003,
            ActionError::Api(_) => 2100,
            ActionError::Export(_) => 2200,
        }
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ActionError::Api(e) => e.message_or(fallback),
            other => other.to_string(),
        }
    }
}
