//! Wire types shared between the HTTP client and the service layer.

pub mod debt;
pub mod errors;
pub mod user;

pub use debt::{CreateDebtInput, Debt, DebtFilter, DebtStatus, DebtSummary, ExportFormat, UpdateDebtInput};
pub use user::{LoginInput, RegisterInput, User};
