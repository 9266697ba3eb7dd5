//! Session cache: the current user plus a single-flight identity query.
//!
//! The user lives in a `watch` cell written only from here. The identity
//! query is a `Shared` future kept in a slot; every caller that arrives
//! while it is cached gets a clone of the same future, so N concurrent
//! callers cause exactly one `GET /auth/me`. A failed query empties the
//! slot so the next caller starts over. Each slot fill is tagged with a
//! generation; a query that was superseded (login, logout, explicit
//! invalidation) can neither publish its user nor clear a newer slot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use client::ApiError;
use futures::future::{BoxFuture, FutureExt, Shared};
use models::{LoginInput, RegisterInput, User};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::errors::AuthError;
use super::repository::AuthRepository;
use crate::validators;

pub type IdentityResult = Result<User, ApiError>;

/// Replayable handle on one identity query.
pub type IdentityFuture = Shared<BoxFuture<'static, IdentityResult>>;

#[derive(Default)]
struct IdentitySlot {
    generation: u64,
    pending: Option<IdentityFuture>,
}

struct Inner<R> {
    repo: Arc<R>,
    user: watch::Sender<Option<User>>,
    identity: Mutex<IdentitySlot>,
}

impl<R> Inner<R> {
    fn slot(&self) -> MutexGuard<'_, IdentitySlot> {
        self.identity.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct SessionCache<R: AuthRepository> {
    inner: Arc<Inner<R>>,
}

impl<R: AuthRepository> Clone for SessionCache<R> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<R: AuthRepository> SessionCache<R> {
    pub fn new(repo: Arc<R>) -> Self {
        let (user, _) = watch::channel(None);
        Self { inner: Arc::new(Inner { repo, user, identity: Mutex::new(IdentitySlot::default()) }) }
    }

    /// Submit credentials. On success the cached identity is dropped and a
    /// fresh identity query is started in the background; callers can
    /// attach to it through [`SessionCache::fetch_current_identity`].
    #[instrument(skip(self, email, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let input = LoginInput { email: email.trim().to_string(), password: password.to_string() };
        validators::validate_login(&input)?;
        self.inner.repo.login(&input).await?;
        info!("login accepted");

        self.clear_cache();
        let identity = self.fetch_current_identity();
        tokio::spawn(async move {
            let _ = identity.await;
        });
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.inner.repo.logout().await?;
        let mut slot = self.inner.slot();
        slot.generation += 1;
        slot.pending = None;
        self.inner.user.send_replace(None);
        info!("logged out");
        Ok(())
    }

    /// Shared identity query. Returns the cached handle when there is one,
    /// otherwise starts a new query and caches it.
    pub fn fetch_current_identity(&self) -> IdentityFuture {
        let mut slot = self.inner.slot();
        if let Some(pending) = &slot.pending {
            debug!(generation = slot.generation, "reusing cached identity query");
            return pending.clone();
        }

        let generation = slot.generation;
        let inner = Arc::clone(&self.inner);
        debug!(generation, "starting identity query");
        let query = async move {
            let result = inner.repo.me().await;
            let mut slot = inner.slot();
            if slot.generation != generation {
                debug!(generation, current = slot.generation, "identity query superseded");
                return result;
            }
            match &result {
                Ok(user) => {
                    debug!(user_id = %user.id, "identity resolved");
                    inner.user.send_replace(Some(user.clone()));
                }
                Err(e) => {
                    warn!(error = %e, "identity query failed");
                    slot.generation += 1;
                    slot.pending = None;
                    inner.user.send_replace(None);
                }
            }
            result
        }
        .boxed()
        .shared();

        slot.pending = Some(query.clone());
        query
    }

    /// `true` straight away when a user is held, otherwise asks the backend.
    pub async fn is_authenticated(&self) -> bool {
        let held = self.inner.user.borrow().is_some();
        if held {
            return true;
        }
        self.fetch_current_identity().await.is_ok()
    }

    /// Last known user, no network access.
    pub fn current_user(&self) -> Option<User> {
        self.inner.user.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.inner.user.subscribe()
    }

    /// Create an account. Does not sign in.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<(), AuthError> {
        validators::validate_register(&input)?;
        self.inner.repo.register(&input).await?;
        info!("account registered");
        Ok(())
    }

    /// Forget the cached identity query; the held user is kept.
    pub fn clear_cache(&self) {
        let mut slot = self.inner.slot();
        slot.generation += 1;
        slot.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use std::time::Duration;

    fn ana() -> User {
        User { id: "u1".into(), first_name: "Ana".into(), last_name: "Gomez".into(), email: "ana@example.com".into() }
    }

    #[tokio::test]
    async fn concurrent_queries_share_one_request() {
        let repo = Arc::new(MockAuthRepository::signed_in(ana()));
        repo.set_me_delay(Duration::from_millis(30));
        let session = SessionCache::new(repo.clone());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let s = session.clone();
                tokio::spawn(async move { s.fetch_current_identity().await })
            })
            .collect();
        for h in handles {
            assert_eq!(h.await.unwrap(), Ok(ana()));
        }
        assert_eq!(repo.me_calls(), 1);
        assert_eq!(session.current_user(), Some(ana()));
    }

    #[tokio::test]
    async fn concurrent_failure_is_shared_then_retried() {
        let repo = Arc::new(MockAuthRepository::signed_in(ana()));
        repo.set_me_delay(Duration::from_millis(10));
        repo.fail_next_me(ApiError::Network("offline".into()));
        let session = SessionCache::new(repo.clone());

        let (a, b, c) = tokio::join!(
            session.fetch_current_identity(),
            session.fetch_current_identity(),
            session.fetch_current_identity()
        );
        assert_eq!(a, Err(ApiError::Network("offline".into())));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(repo.me_calls(), 1);
        assert_eq!(session.current_user(), None);

        // the failure is not replayed
        assert_eq!(session.fetch_current_identity().await, Ok(ana()));
        assert_eq!(repo.me_calls(), 2);
    }

    #[tokio::test]
    async fn success_is_replayed_without_new_requests() {
        let repo = Arc::new(MockAuthRepository::signed_in(ana()));
        let session = SessionCache::new(repo.clone());
        session.fetch_current_identity().await.unwrap();
        session.fetch_current_identity().await.unwrap();
        assert_eq!(repo.me_calls(), 1);
    }

    #[tokio::test]
    async fn held_user_short_circuits_is_authenticated() {
        let repo = Arc::new(MockAuthRepository::signed_in(ana()));
        let session = SessionCache::new(repo.clone());
        session.fetch_current_identity().await.unwrap();
        session.clear_cache();

        assert!(session.is_authenticated().await);
        assert_eq!(repo.me_calls(), 1);
    }

    #[tokio::test]
    async fn anonymous_is_not_authenticated() {
        let repo = Arc::new(MockAuthRepository::default());
        let session = SessionCache::new(repo.clone());
        assert!(!session.is_authenticated().await);
        assert!(!session.is_authenticated().await);
        // each failure clears the cache, so both checks hit the backend
        assert_eq!(repo.me_calls(), 2);
    }

    #[tokio::test]
    async fn login_loads_user_and_logout_clears_it() {
        let repo = Arc::new(MockAuthRepository::with_account("ana@example.com", "Secreta1!", ana()));
        let session = SessionCache::new(repo.clone());
        let mut updates = session.subscribe();

        session.login("ana@example.com", "Secreta1!").await.unwrap();
        updates.wait_for(|u| u.is_some()).await.unwrap();
        assert_eq!(session.current_user(), Some(ana()));
        // the background query is the cached one
        assert_eq!(session.fetch_current_identity().await, Ok(ana()));
        assert_eq!(repo.me_calls(), 1);

        session.logout().await.unwrap();
        assert_eq!(session.current_user(), None);
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn failed_login_keeps_state() {
        let repo = Arc::new(MockAuthRepository::signed_in(ana()));
        let session = SessionCache::new(repo.clone());
        session.fetch_current_identity().await.unwrap();

        let err = session.login("ana@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.user_message("Credenciales incorrectas"), "Credenciales incorrectas");
        assert_eq!(err.code(), 1004);
        assert_eq!(session.current_user(), Some(ana()));
        session.fetch_current_identity().await.unwrap();
        assert_eq!(repo.me_calls(), 1);
    }

    #[tokio::test]
    async fn invalid_login_form_never_reaches_backend() {
        let repo = Arc::new(MockAuthRepository::default());
        let session = SessionCache::new(repo.clone());
        let err = session.login("not-an-email", "x").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(repo.login_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_logout_keeps_user() {
        let repo = Arc::new(MockAuthRepository::signed_in(ana()));
        repo.fail_logout(true);
        let session = SessionCache::new(repo.clone());
        session.fetch_current_identity().await.unwrap();
        assert!(session.logout().await.is_err());
        assert_eq!(session.current_user(), Some(ana()));
    }

    #[tokio::test]
    async fn superseded_query_does_not_publish() {
        let repo = Arc::new(MockAuthRepository::signed_in(ana()));
        repo.set_me_delay(Duration::from_millis(20));
        let session = SessionCache::new(repo.clone());

        let stale = tokio::spawn(session.fetch_current_identity());
        tokio::time::sleep(Duration::from_millis(5)).await;
        session.clear_cache();

        // the request itself still completes for whoever awaited it
        assert_eq!(stale.await.unwrap(), Ok(ana()));
        assert_eq!(session.current_user(), None);

        // and a fresh query publishes normally
        session.fetch_current_identity().await.unwrap();
        assert_eq!(session.current_user(), Some(ana()));
        assert_eq!(repo.me_calls(), 2);
    }

    #[tokio::test]
    async fn register_validates_before_calling_backend() {
        let repo = Arc::new(MockAuthRepository::default());
        let session = SessionCache::new(repo.clone());
        let weak = RegisterInput {
            first_name: "Ana".into(),
            last_name: "Gomez".into(),
            email: "ana@example.com".into(),
            password: "abc".into(),
        };
        assert!(matches!(session.register(weak).await, Err(AuthError::Validation(_))));
        assert_eq!(repo.register_calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        let strong = RegisterInput { password: "Abcdef1!".into(), ..weak_template() };
        session.register(strong.clone()).await.unwrap();
        let dup = session.register(strong).await.unwrap_err();
        assert_eq!(dup.user_message("Error al registrar"), "El email ya está registrado");
        assert_eq!(session.current_user(), None);
    }

    fn weak_template() -> RegisterInput {
        RegisterInput {
            first_name: "Ana".into(),
            last_name: "Gomez".into(),
            email: "ana@example.com".into(),
            password: String::new(),
        }
    }
}
