use async_trait::async_trait;
use client::{ApiClient, ApiError};
use models::{CreateDebtInput, Debt, DebtFilter, DebtSummary, UpdateDebtInput};

use crate::debts::repository::DebtRepository;

#[async_trait]
impl DebtRepository for ApiClient {
    async fn list(&self, filter: DebtFilter) -> Result<Vec<Debt>, ApiError> {
        self.list_debts(filter).await
    }

    async fn summary(&self) -> Result<DebtSummary, ApiError> {
        ApiClient::summary(self).await
    }

    async fn get(&self, id: &str) -> Result<Debt, ApiError> {
        self.get_debt(id).await
    }

    async fn create(&self, input: &CreateDebtInput) -> Result<Debt, ApiError> {
        self.create_debt(input).await
    }

    async fn update(&self, id: &str, input: &UpdateDebtInput) -> Result<Debt, ApiError> {
        self.update_debt(id, input).await
    }

    async fn pay(&self, id: &str) -> Result<Debt, ApiError> {
        self.pay_debt(id).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.delete_debt(id).await
    }

    async fn export_csv(&self) -> Result<Vec<u8>, ApiError> {
        ApiClient::export_csv(self).await
    }

    async fn export_json(&self) -> Result<serde_json::Value, ApiError> {
        ApiClient::export_json(self).await
    }
}
