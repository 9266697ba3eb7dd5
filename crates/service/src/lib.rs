//! Client-side services for the debt tracker: session cache and route
//! guards, the refreshable debt list, debt actions, export and form
//! validation. Backends are reached through the repository traits, which
//! `client::ApiClient` implements.

pub mod auth;
pub mod debts;
pub mod routes;
pub mod validators;

pub use auth::{AuthError, SessionCache};
pub use debts::{ActionError, DebtActions, DebtListPipeline, DebtQueries};
pub use routes::{History, Navigator, Route};
