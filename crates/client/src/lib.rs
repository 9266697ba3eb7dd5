//! HTTP client for the debt tracker backend.
//!
//! One method per endpoint. Every call shares a single `reqwest::Client`
//! with a cookie store, so the session cookie set by `/auth/login` rides
//! along on all later requests.

use std::sync::Arc;

use models::{CreateDebtInput, Debt, DebtFilter, DebtSummary, ExportFormat, LoginInput, RegisterInput, UpdateDebtInput, User};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

mod errors;

pub use errors::ApiError;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    /// Use a preconfigured `reqwest::Client`; it should have a cookie store.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self { http, base_url: Arc::from(base_url.trim_end_matches('/')) }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "backend request");
        self.http.request(method, url)
    }

    /// `/debts/{id}[/{action}]` with `id` as a single percent-encoded segment.
    fn debt_request(&self, method: Method, id: &str, action: Option<&str>) -> Result<RequestBuilder, ApiError> {
        let mut url = Url::parse(&format!("{}/debts", self.base_url)).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot carry a path", self.base_url)))?
            .push(id)
            .extend(action);
        debug!(%method, %url, "backend request");
        Ok(self.http.request(method, url))
    }

    async fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "backend response");
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp
            .json::<errors::ErrorBody>()
            .await
            .ok()
            .and_then(errors::ErrorBody::into_message);
        Err(ApiError::Status { status: status.as_u16(), message })
    }

    async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ApiError> {
        let resp = Self::check(req.send().await?).await?;
        resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_empty(req: RequestBuilder) -> Result<(), ApiError> {
        Self::check(req.send().await?).await?;
        Ok(())
    }

    fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestBuilder {
        self.request(Method::POST, path).json(body)
    }

    // ---- auth ----

    pub async fn login(&self, input: &LoginInput) -> Result<(), ApiError> {
        Self::send_empty(self.post_json("/auth/login", input)).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        Self::send_empty(self.post_json("/auth/logout", &serde_json::json!({}))).await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        Self::send_json(self.request(Method::GET, "/auth/me")).await
    }

    pub async fn register(&self, input: &RegisterInput) -> Result<(), ApiError> {
        Self::send_empty(self.post_json("/auth/register", input)).await
    }

    // ---- debts ----

    /// `GET /debts` with an optional status filter and a cache-busting `_t`.
    pub async fn list_debts(&self, filter: DebtFilter) -> Result<Vec<Debt>, ApiError> {
        let stamp = chrono::Utc::now().timestamp_millis().to_string();
        let mut query: Vec<(&str, &str)> = Vec::with_capacity(2);
        if let Some(status) = filter.status_param() {
            query.push(("status", status));
        }
        query.push(("_t", stamp.as_str()));
        Self::send_json(self.request(Method::GET, "/debts").query(&query)).await
    }

    pub async fn summary(&self) -> Result<DebtSummary, ApiError> {
        Self::send_json(self.request(Method::GET, "/debts/summary")).await
    }

    pub async fn get_debt(&self, id: &str) -> Result<Debt, ApiError> {
        Self::send_json(self.debt_request(Method::GET, id, None)?).await
    }

    pub async fn create_debt(&self, input: &CreateDebtInput) -> Result<Debt, ApiError> {
        Self::send_json(self.post_json("/debts", input)).await
    }

    pub async fn update_debt(&self, id: &str, input: &UpdateDebtInput) -> Result<Debt, ApiError> {
        Self::send_json(self.debt_request(Method::PATCH, id, None)?.json(input)).await
    }

    pub async fn pay_debt(&self, id: &str) -> Result<Debt, ApiError> {
        Self::send_json(self.debt_request(Method::POST, id, Some("pay"))?.json(&serde_json::json!({}))).await
    }

    pub async fn delete_debt(&self, id: &str) -> Result<(), ApiError> {
        Self::send_empty(self.debt_request(Method::DELETE, id, None)?).await
    }

    /// CSV export as raw bytes.
    pub async fn export_csv(&self) -> Result<Vec<u8>, ApiError> {
        let req = self
            .request(Method::GET, "/debts/export")
            .query(&[("format", ExportFormat::Csv.as_param())]);
        let resp = Self::check(req.send().await?).await?;
        let bytes = resp.bytes().await.map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    pub async fn export_json(&self) -> Result<serde_json::Value, ApiError> {
        let req = self
            .request(Method::GET, "/debts/export")
            .query(&[("format", ExportFormat::Json.as_param())]);
        Self::send_json(req).await
    }
}
