//! Debt list pipeline, mutation handlers, read-only queries and export.

pub mod actions;
pub mod errors;
pub mod export;
pub mod pipeline;
pub mod queries;
pub mod repo;
pub mod repository;

pub use actions::DebtActions;
pub use errors::ActionError;
pub use pipeline::{apply_filter, DebtListPipeline};
pub use queries::DebtQueries;
