use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown debt filter: {0} (expected all, pending or paid)")]
    UnknownFilter(String),
    #[error("unknown export format: {0} (expected csv or json)")]
    UnknownFormat(String),
}
