use serde::Deserialize;
use thiserror::Error;

/// Transport-level failures of a backend call.
///
/// `Clone` so a single in-flight result can be handed to every waiter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status { status: u16, message: Option<String> },
    #[error("parse error: {0}")]
    Decode(String),
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Backend-provided message when there is one, else `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { message: Some(m), .. } => m.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Error payload shape of the backend: `message` is a string or a list of strings.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    message: Option<serde_json::Value>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        match self.message? {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Array(items) => {
                let parts: Vec<String> = items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                if parts.is_empty() { None } else { Some(parts.join("; ")) }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_string_and_list() {
        let one: ErrorBody = serde_json::from_str(r#"{"message":"Email ya registrado"}"#).unwrap();
        assert_eq!(one.into_message().as_deref(), Some("Email ya registrado"));
        let many: ErrorBody = serde_json::from_str(r#"{"message":["amount must be positive","title too short"]}"#).unwrap();
        assert_eq!(many.into_message().as_deref(), Some("amount must be positive; title too short"));
        let none: ErrorBody = serde_json::from_str(r#"{"statusCode":500}"#).unwrap();
        assert_eq!(none.into_message(), None);
    }

    #[test]
    fn message_or_prefers_backend_message() {
        let e = ApiError::Status { status: 409, message: Some("duplicate".into()) };
        assert_eq!(e.message_or("fallback"), "duplicate");
        assert_eq!(ApiError::Network("down".into()).message_or("fallback"), "fallback");
        assert!(ApiError::Status { status: 401, message: None }.is_unauthorized());
    }
}
