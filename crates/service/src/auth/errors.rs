use client::ApiError;
use thiserror::Error;

use crate::validators::ValidationError;

/// Failures of login, logout, registration and identity queries.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Api(e) if e.is_unauthorized() => 1004,
            AuthError::Api(ApiError::Network(_)) => 1201,
            AuthError::Api(_) => 1200,
        }
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AuthError::Validation(e) => e.to_string(),
            AuthError::Api(e) => e.message_or(fallback),
        }
    }
}
