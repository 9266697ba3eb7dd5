use async_trait::async_trait;
use client::ApiError;
use models::{CreateDebtInput, Debt, DebtFilter, DebtSummary, UpdateDebtInput};

/// Backend abstraction for the debt endpoints.
#[async_trait]
pub trait DebtRepository: Send + Sync + 'static {
    async fn list(&self, filter: DebtFilter) -> Result<Vec<Debt>, ApiError>;
    async fn summary(&self) -> Result<DebtSummary, ApiError>;
    async fn get(&self, id: &str) -> Result<Debt, ApiError>;
    async fn create(&self, input: &CreateDebtInput) -> Result<Debt, ApiError>;
    async fn update(&self, id: &str, input: &UpdateDebtInput) -> Result<Debt, ApiError>;
    async fn pay(&self, id: &str) -> Result<Debt, ApiError>;
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
    async fn export_csv(&self) -> Result<Vec<u8>, ApiError>;
    async fn export_json(&self) -> Result<serde_json::Value, ApiError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use chrono::{TimeZone, Utc};
    use models::DebtStatus;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    pub fn debt(id: &str, title: &str, amount: f64, status: DebtStatus) -> Debt {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Debt {
            id: id.to_string(),
            title: title.to_string(),
            amount,
            status,
            created_at: at,
            updated_at: at,
            paid_at: (status == DebtStatus::Paid).then_some(at),
        }
    }

    fn not_found(id: &str) -> ApiError {
        ApiError::Status { status: 404, message: Some(format!("Deuda {id} no encontrada")) }
    }

    #[derive(Default)]
    pub struct MockDebtRepository {
        debts: Mutex<Vec<Debt>>,
        list_delays: Mutex<VecDeque<Duration>>,
        fail_next_list: AtomicBool,
        fail_mutations: AtomicBool,
        next_id: AtomicUsize,
        pub list_calls: AtomicUsize,
        pub mutation_calls: AtomicUsize,
    }

    impl MockDebtRepository {
        pub fn with_debts(debts: Vec<Debt>) -> Self {
            let repo = Self::default();
            repo.next_id.store(debts.len(), Ordering::SeqCst);
            *repo.debts.lock().unwrap() = debts;
            repo
        }

        /// Delay applied to the next `list` call; queued in call order.
        pub fn push_list_delay(&self, delay: Duration) {
            self.list_delays.lock().unwrap().push_back(delay);
        }

        pub fn fail_next_list(&self) {
            self.fail_next_list.store(true, Ordering::SeqCst);
        }

        pub fn fail_mutations(&self, fail: bool) {
            self.fail_mutations.store(fail, Ordering::SeqCst);
        }

        pub fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        pub fn mutation_calls(&self) -> usize {
            self.mutation_calls.load(Ordering::SeqCst)
        }

        pub fn snapshot(&self) -> Vec<Debt> {
            self.debts.lock().unwrap().clone()
        }

        pub fn insert(&self, debt: Debt) {
            self.debts.lock().unwrap().push(debt);
        }

        fn begin_mutation(&self) -> Result<(), ApiError> {
            self.mutation_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(ApiError::Status { status: 500, message: Some("Error interno".into()) });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DebtRepository for MockDebtRepository {
        async fn list(&self, filter: DebtFilter) -> Result<Vec<Debt>, ApiError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            // the answer reflects the data at request time
            let snapshot: Vec<Debt> = self
                .debts
                .lock()
                .unwrap()
                .iter()
                .filter(|d| filter.matches(d.status))
                .cloned()
                .collect();
            let delay = self.list_delays.lock().unwrap().pop_front();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_next_list.swap(false, Ordering::SeqCst) {
                return Err(ApiError::Network("connection refused".into()));
            }
            Ok(snapshot)
        }

        async fn summary(&self) -> Result<DebtSummary, ApiError> {
            let debts = self.debts.lock().unwrap();
            let mut s = DebtSummary::default();
            for d in debts.iter() {
                match d.status {
                    DebtStatus::Paid => {
                        s.total_pagado += d.amount;
                        s.cantidad_pagadas += 1;
                    }
                    DebtStatus::Pending => {
                        s.total_pendiente += d.amount;
                        s.cantidad_pendientes += 1;
                    }
                }
            }
            Ok(s)
        }

        async fn get(&self, id: &str) -> Result<Debt, ApiError> {
            self.debts.lock().unwrap().iter().find(|d| d.id == id).cloned().ok_or_else(|| not_found(id))
        }

        async fn create(&self, input: &CreateDebtInput) -> Result<Debt, ApiError> {
            self.begin_mutation()?;
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let created = debt(&format!("d{n}"), &input.title, input.amount, DebtStatus::Pending);
            self.debts.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update(&self, id: &str, input: &UpdateDebtInput) -> Result<Debt, ApiError> {
            self.begin_mutation()?;
            let mut debts = self.debts.lock().unwrap();
            let found = debts.iter_mut().find(|d| d.id == id).ok_or_else(|| not_found(id))?;
            if let Some(title) = &input.title {
                found.title = title.clone();
            }
            if let Some(amount) = input.amount {
                found.amount = amount;
            }
            found.updated_at = Utc::now();
            Ok(found.clone())
        }

        async fn pay(&self, id: &str) -> Result<Debt, ApiError> {
            self.begin_mutation()?;
            let mut debts = self.debts.lock().unwrap();
            let found = debts.iter_mut().find(|d| d.id == id).ok_or_else(|| not_found(id))?;
            let now = Utc::now();
            found.status = DebtStatus::Paid;
            found.paid_at = Some(now);
            found.updated_at = now;
            Ok(found.clone())
        }

        async fn delete(&self, id: &str) -> Result<(), ApiError> {
            self.begin_mutation()?;
            let mut debts = self.debts.lock().unwrap();
            let before = debts.len();
            debts.retain(|d| d.id != id);
            if debts.len() == before {
                return Err(not_found(id));
            }
            Ok(())
        }

        async fn export_csv(&self) -> Result<Vec<u8>, ApiError> {
            let mut out = String::from("id,title,amount,status\n");
            for d in self.debts.lock().unwrap().iter() {
                out.push_str(&format!("{},{},{},{}\n", d.id, d.title, d.amount, d.status.as_str()));
            }
            Ok(out.into_bytes())
        }

        async fn export_json(&self) -> Result<serde_json::Value, ApiError> {
            serde_json::to_value(self.snapshot()).map_err(|e| ApiError::Decode(e.to_string()))
        }
    }
}
