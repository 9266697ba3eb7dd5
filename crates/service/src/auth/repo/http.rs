use async_trait::async_trait;
use client::{ApiClient, ApiError};
use models::{LoginInput, RegisterInput, User};

use crate::auth::repository::AuthRepository;

#[async_trait]
impl AuthRepository for ApiClient {
    async fn login(&self, input: &LoginInput) -> Result<(), ApiError> {
        ApiClient::login(self, input).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        ApiClient::logout(self).await
    }

    async fn me(&self) -> Result<User, ApiError> {
        ApiClient::me(self).await
    }

    async fn register(&self, input: &RegisterInput) -> Result<(), ApiError> {
        ApiClient::register(self, input).await
    }
}
