//! Navigable views and the navigation sink guards redirect through.

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Debts,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/auth/login",
            Route::Register => "/auth/register",
            Route::Debts => "/debts",
        }
    }

    /// Map a path to a route. The empty path and unknown paths redirect to login.
    pub fn resolve(path: &str) -> Route {
        match path.trim().trim_end_matches('/').trim_start_matches('/') {
            "auth/register" => Route::Register,
            "debts" => Route::Debts,
            _ => Route::Login,
        }
    }

    /// Whether entering the route requires an authenticated session.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Debts)
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// In-memory navigation history.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<Route>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).last().copied()
    }

    pub fn entries(&self) -> Vec<Route> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route) {
        tracing::debug!(path = route.path(), "navigate");
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_and_fallback_paths() {
        assert_eq!(Route::resolve("/debts"), Route::Debts);
        assert_eq!(Route::resolve("debts/"), Route::Debts);
        assert_eq!(Route::resolve("/auth/register"), Route::Register);
        assert_eq!(Route::resolve(""), Route::Login);
        assert_eq!(Route::resolve("/"), Route::Login);
        assert_eq!(Route::resolve("/nope/nothing"), Route::Login);
    }

    #[test]
    fn history_tracks_last_route() {
        let h = History::new();
        assert_eq!(h.current(), None);
        h.navigate(Route::Login);
        h.navigate(Route::Debts);
        assert_eq!(h.current(), Some(Route::Debts));
        assert_eq!(h.entries(), vec![Route::Login, Route::Debts]);
    }
}
