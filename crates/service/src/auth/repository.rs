use async_trait::async_trait;
use client::ApiError;
use models::{LoginInput, RegisterInput, User};

/// Backend abstraction for the auth endpoints.
#[async_trait]
pub trait AuthRepository: Send + Sync + 'static {
    async fn login(&self, input: &LoginInput) -> Result<(), ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn me(&self) -> Result<User, ApiError>;
    async fn register(&self, input: &RegisterInput) -> Result<(), ApiError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Behaves like a cookie session: `login` opens it, `logout` closes it,
    /// `me` answers 401 while it is closed.
    #[derive(Default)]
    pub struct MockAuthRepository {
        accounts: Mutex<HashMap<String, (String, User)>>, // key: email
        session: Mutex<Option<User>>,
        me_delay: Mutex<Duration>,
        fail_next_me: Mutex<Option<ApiError>>,
        fail_logout: Mutex<bool>,
        pub me_calls: AtomicUsize,
        pub login_calls: AtomicUsize,
        pub register_calls: AtomicUsize,
    }

    impl MockAuthRepository {
        pub fn with_account(email: &str, password: &str, user: User) -> Self {
            let repo = Self::default();
            repo.accounts.lock().unwrap().insert(email.to_string(), (password.to_string(), user));
            repo
        }

        /// Pretend a session cookie is already present.
        pub fn signed_in(user: User) -> Self {
            let repo = Self::default();
            *repo.session.lock().unwrap() = Some(user);
            repo
        }

        pub fn set_me_delay(&self, delay: Duration) {
            *self.me_delay.lock().unwrap() = delay;
        }

        pub fn fail_next_me(&self, err: ApiError) {
            *self.fail_next_me.lock().unwrap() = Some(err);
        }

        pub fn fail_logout(&self, fail: bool) {
            *self.fail_logout.lock().unwrap() = fail;
        }

        pub fn me_calls(&self) -> usize {
            self.me_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn login(&self, input: &LoginInput) -> Result<(), ApiError> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            let found = self.accounts.lock().unwrap().get(&input.email).cloned();
            match found {
                Some((password, user)) if password == input.password => {
                    *self.session.lock().unwrap() = Some(user);
                    Ok(())
                }
                _ => Err(ApiError::Status { status: 401, message: Some("Credenciales incorrectas".into()) }),
            }
        }

        async fn logout(&self) -> Result<(), ApiError> {
            if *self.fail_logout.lock().unwrap() {
                return Err(ApiError::Network("connection reset".into()));
            }
            *self.session.lock().unwrap() = None;
            Ok(())
        }

        async fn me(&self) -> Result<User, ApiError> {
            self.me_calls.fetch_add(1, Ordering::SeqCst);
            let delay = *self.me_delay.lock().unwrap();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Some(err) = self.fail_next_me.lock().unwrap().take() {
                return Err(err);
            }
            self.session
                .lock()
                .unwrap()
                .clone()
                .ok_or(ApiError::Status { status: 401, message: Some("No autenticado".into()) })
        }

        async fn register(&self, input: &RegisterInput) -> Result<(), ApiError> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(&input.email) {
                return Err(ApiError::Status { status: 409, message: Some("El email ya está registrado".into()) });
            }
            let user = User {
                id: format!("u{}", accounts.len() + 1),
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                email: input.email.clone(),
            };
            accounts.insert(input.email.clone(), (input.password.clone(), user));
            Ok(())
        }
    }
}
