use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DebtStatus {
    Pending,
    Paid,
}

impl DebtStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtStatus::Pending => "PENDING",
            DebtStatus::Paid => "PAID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub status: DebtStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Debt {
    /// Paid debts are read-only on the client.
    pub fn is_paid(&self) -> bool {
        self.status == DebtStatus::Paid
    }
}

/// Aggregates computed by `GET /debts/summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSummary {
    pub total_pagado: f64,
    pub total_pendiente: f64,
    pub cantidad_pagadas: u64,
    pub cantidad_pendientes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDebtInput {
    pub title: String,
    pub amount: f64,
}

/// Partial update; absent fields are left alone by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDebtInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// List view selection. Held in memory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtFilter {
    #[default]
    All,
    Pending,
    Paid,
}

impl DebtFilter {
    /// Value of the `status` query parameter, `None` for `All`.
    pub fn status_param(&self) -> Option<&'static str> {
        match self {
            DebtFilter::All => None,
            DebtFilter::Pending => Some(DebtStatus::Pending.as_str()),
            DebtFilter::Paid => Some(DebtStatus::Paid.as_str()),
        }
    }

    pub fn matches(&self, status: DebtStatus) -> bool {
        match self {
            DebtFilter::All => true,
            DebtFilter::Pending => status == DebtStatus::Pending,
            DebtFilter::Paid => status == DebtStatus::Paid,
        }
    }
}

impl FromStr for DebtFilter {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DebtFilter::All),
            "pending" => Ok(DebtFilter::Pending),
            "paid" => Ok(DebtFilter::Paid),
            other => Err(ModelError::UnknownFilter(other.to_string())),
        }
    }
}

impl fmt::Display for DebtFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DebtFilter::All => "all",
            DebtFilter::Pending => "pending",
            DebtFilter::Paid => "paid",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_param(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "deudas.csv",
            ExportFormat::Json => "deudas.json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ModelError::UnknownFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debt_parses_backend_payload() {
        let raw = r#"{
            "id": "d1",
            "title": "Arriendo",
            "amount": 1200000,
            "status": "PAID",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-05T10:00:00Z",
            "paidAt": "2024-03-05T10:00:00Z"
        }"#;
        let debt: Debt = serde_json::from_str(raw).unwrap();
        assert!(debt.is_paid());
        assert_eq!(debt.amount, 1_200_000.0);
        assert!(debt.paid_at.is_some());
    }

    #[test]
    fn pending_debt_without_paid_at() {
        let raw = r#"{"id":"d2","title":"Luz","amount":80000.5,"status":"PENDING",
            "createdAt":"2024-03-01T10:00:00Z","updatedAt":"2024-03-01T10:00:00Z"}"#;
        let debt: Debt = serde_json::from_str(raw).unwrap();
        assert_eq!(debt.status, DebtStatus::Pending);
        assert!(debt.paid_at.is_none());
    }

    #[test]
    fn update_input_omits_absent_fields() {
        let body = serde_json::to_value(UpdateDebtInput { title: Some("Agua".into()), amount: None }).unwrap();
        assert_eq!(body, serde_json::json!({"title": "Agua"}));
    }

    #[test]
    fn filter_parsing_and_status_param() {
        assert_eq!("Paid".parse::<DebtFilter>().unwrap(), DebtFilter::Paid);
        assert_eq!(DebtFilter::All.status_param(), None);
        assert_eq!(DebtFilter::Pending.status_param(), Some("PENDING"));
        assert!("overdue".parse::<DebtFilter>().is_err());
    }

    #[test]
    fn summary_uses_backend_field_names() {
        let s: DebtSummary = serde_json::from_str(
            r#"{"totalPagado":10,"totalPendiente":20.5,"cantidadPagadas":1,"cantidadPendientes":2}"#,
        )
        .unwrap();
        assert_eq!(s.total_pendiente, 20.5);
        assert_eq!(s.cantidad_pendientes, 2);
    }
}
