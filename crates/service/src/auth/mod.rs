//! Auth module: backend abstraction (repository), the session cache and
//! the route guards built on top of it.

pub mod errors;
pub mod guards;
pub mod repo;
pub mod repository;
pub mod session;

pub use errors::AuthError;
pub use guards::{AuthGuard, GuestGuard, RouteGuard};
pub use session::SessionCache;
