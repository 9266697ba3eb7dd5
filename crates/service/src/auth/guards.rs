//! Route guards over the session cache. The only side effect of a guard
//! is navigation; session state is never touched.

use async_trait::async_trait;
use tracing::debug;

use super::repository::AuthRepository;
use super::session::SessionCache;
use crate::routes::{Navigator, Route};

/// Decides whether a route may be entered.
#[async_trait]
pub trait RouteGuard: Send + Sync {
    async fn can_activate(&self, nav: &dyn Navigator) -> bool;
}

/// Admits authenticated sessions; sends everyone else to the login view.
pub struct AuthGuard<R: AuthRepository> {
    session: SessionCache<R>,
}

impl<R: AuthRepository> AuthGuard<R> {
    pub fn new(session: SessionCache<R>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl<R: AuthRepository> RouteGuard for AuthGuard<R> {
    async fn can_activate(&self, nav: &dyn Navigator) -> bool {
        if self.session.is_authenticated().await {
            return true;
        }
        debug!("not authenticated, redirecting to login");
        nav.navigate(Route::Login);
        false
    }
}

/// Admits anonymous sessions; sends signed-in users to the debt list.
pub struct GuestGuard<R: AuthRepository> {
    session: SessionCache<R>,
}

impl<R: AuthRepository> GuestGuard<R> {
    pub fn new(session: SessionCache<R>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl<R: AuthRepository> RouteGuard for GuestGuard<R> {
    async fn can_activate(&self, nav: &dyn Navigator) -> bool {
        if !self.session.is_authenticated().await {
            return true;
        }
        debug!("already authenticated, redirecting to debts");
        nav.navigate(Route::Debts);
        false
    }
}

/// Guard protecting `route`.
pub fn guard_for<R: AuthRepository>(route: Route, session: &SessionCache<R>) -> Box<dyn RouteGuard> {
    if route.requires_auth() {
        Box::new(AuthGuard::new(session.clone()))
    } else {
        Box::new(GuestGuard::new(session.clone()))
    }
}

/// Resolve `path`, run its guard and navigate there when admitted.
/// Returns the route that ended up current, if any navigation happened.
pub async fn enter<R: AuthRepository>(path: &str, session: &SessionCache<R>, nav: &dyn Navigator) -> Option<Route> {
    let route = Route::resolve(path);
    if guard_for(route, session).can_activate(nav).await {
        nav.navigate(route);
        return Some(route);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use crate::routes::History;
    use models::User;
    use std::sync::Arc;

    fn ana() -> User {
        User { id: "u1".into(), first_name: "Ana".into(), last_name: "Gomez".into(), email: "ana@example.com".into() }
    }

    #[tokio::test]
    async fn auth_guard_redirects_anonymous_to_login() {
        let session = SessionCache::new(Arc::new(MockAuthRepository::default()));
        let nav = History::new();
        assert!(!AuthGuard::new(session.clone()).can_activate(&nav).await);
        assert_eq!(nav.current(), Some(Route::Login));
        assert_eq!(session.current_user(), None);
    }

    #[tokio::test]
    async fn guest_guard_redirects_signed_in_to_debts() {
        let session = SessionCache::new(Arc::new(MockAuthRepository::signed_in(ana())));
        let nav = History::new();
        assert!(!GuestGuard::new(session).can_activate(&nav).await);
        assert_eq!(nav.current(), Some(Route::Debts));
    }

    #[tokio::test]
    async fn guards_admit_without_navigating() {
        let signed_in = SessionCache::new(Arc::new(MockAuthRepository::signed_in(ana())));
        let anonymous = SessionCache::new(Arc::new(MockAuthRepository::default()));
        let nav = History::new();
        assert!(AuthGuard::new(signed_in).can_activate(&nav).await);
        assert!(GuestGuard::new(anonymous).can_activate(&nav).await);
        assert!(nav.entries().is_empty());
    }

    #[tokio::test]
    async fn enter_runs_the_route_guard() {
        let repo = Arc::new(MockAuthRepository::signed_in(ana()));
        let session = SessionCache::new(repo.clone());
        let nav = History::new();

        assert_eq!(enter("/debts", &session, &nav).await, Some(Route::Debts));
        // login is guest-only, so a signed-in user bounces back to debts
        assert_eq!(enter("/auth/login", &session, &nav).await, None);
        assert_eq!(nav.entries(), vec![Route::Debts, Route::Debts]);
        // the held user answered the second check
        assert_eq!(repo.me_calls(), 1);
    }

    #[tokio::test]
    async fn unknown_path_lands_on_login_for_guests() {
        let session = SessionCache::new(Arc::new(MockAuthRepository::default()));
        let nav = History::new();
        assert_eq!(enter("/whatever", &session, &nav).await, Some(Route::Login));
    }
}
