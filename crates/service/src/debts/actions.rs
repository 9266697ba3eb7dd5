//! User-triggered debt operations.
//!
//! Every successful mutation asks the list pipeline for a full refetch;
//! the held collection is never patched locally. A failed mutation leaves
//! the collection as it was.

use std::sync::Arc;

use models::{CreateDebtInput, Debt, UpdateDebtInput};
use tracing::{info, instrument};

use super::errors::ActionError;
use super::pipeline::DebtListPipeline;
use super::repository::DebtRepository;
use crate::validators;

pub struct DebtActions<R: DebtRepository> {
    repo: Arc<R>,
    list: DebtListPipeline,
}

fn ensure_pending(debt: &Debt) -> Result<(), ActionError> {
    if debt.is_paid() {
        return Err(ActionError::AlreadyPaid(debt.id.clone()));
    }
    Ok(())
}

impl<R: DebtRepository> DebtActions<R> {
    pub fn new(repo: Arc<R>, list: DebtListPipeline) -> Self {
        Self { repo, list }
    }

    pub fn list(&self) -> &DebtListPipeline {
        &self.list
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateDebtInput) -> Result<Debt, ActionError> {
        validators::validate_debt_fields(&input.title, input.amount)?;
        let input = CreateDebtInput { title: input.title.trim().to_string(), amount: input.amount };
        let created = self.repo.create(&input).await?;
        info!(debt_id = %created.id, "debt created");
        self.list.refresh();
        Ok(created)
    }

    #[instrument(skip(self, debt, input), fields(debt_id = %debt.id))]
    pub async fn edit(&self, debt: &Debt, input: UpdateDebtInput) -> Result<Debt, ActionError> {
        ensure_pending(debt)?;
        if input.title.is_none() && input.amount.is_none() {
            return Err(validators::ValidationError::Required { field: "title or amount" }.into());
        }
        if let Some(title) = &input.title {
            validators::validate_title(title)?;
        }
        if let Some(amount) = input.amount {
            validators::validate_amount(amount)?;
        }
        let input = UpdateDebtInput { title: input.title.map(|t| t.trim().to_string()), amount: input.amount };
        let updated = self.repo.update(&debt.id, &input).await?;
        info!("debt updated");
        self.list.refresh();
        Ok(updated)
    }

    #[instrument(skip(self, debt), fields(debt_id = %debt.id))]
    pub async fn pay(&self, debt: &Debt) -> Result<Debt, ActionError> {
        ensure_pending(debt)?;
        let paid = self.repo.pay(&debt.id).await?;
        info!("debt paid");
        self.list.refresh();
        Ok(paid)
    }

    #[instrument(skip(self, debt), fields(debt_id = %debt.id))]
    pub async fn delete(&self, debt: &Debt) -> Result<(), ActionError> {
        ensure_pending(debt)?;
        self.repo.delete(&debt.id).await?;
        info!("debt deleted");
        self.list.refresh();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debts::repository::mock::{debt, MockDebtRepository};
    use models::{DebtFilter, DebtStatus};

    async fn setup() -> (Arc<MockDebtRepository>, DebtActions<MockDebtRepository>) {
        let repo = Arc::new(MockDebtRepository::with_debts(vec![
            debt("d1", "Arriendo", 1_000_000.0, DebtStatus::Pending),
            debt("d2", "Luz", 90_000.0, DebtStatus::Paid),
        ]));
        let list = DebtListPipeline::spawn(repo.clone(), DebtFilter::All);
        list.wait_idle().await;
        (repo.clone(), DebtActions::new(repo, list))
    }

    #[tokio::test]
    async fn pay_then_refresh_shows_paid() {
        let (repo, actions) = setup().await;
        let pending = actions.list().snapshot().into_iter().find(|d| d.id == "d1").unwrap();
        actions.pay(&pending).await.unwrap();
        actions.list().wait_idle().await;

        let after = actions.list().snapshot();
        assert_eq!(after.iter().find(|d| d.id == "d1").unwrap().status, DebtStatus::Paid);
        assert_eq!(repo.list_calls(), 2);
    }

    #[tokio::test]
    async fn paid_debts_are_read_only() {
        let (repo, actions) = setup().await;
        let paid = actions.list().snapshot().into_iter().find(|d| d.id == "d2").unwrap();

        assert!(matches!(actions.pay(&paid).await, Err(ActionError::AlreadyPaid(_))));
        assert!(matches!(actions.delete(&paid).await, Err(ActionError::AlreadyPaid(_))));
        let edit = UpdateDebtInput { title: Some("Luz y agua".into()), amount: None };
        assert!(matches!(actions.edit(&paid, edit).await, Err(ActionError::AlreadyPaid(_))));
        assert_eq!(repo.mutation_calls(), 0);
        assert_eq!(repo.list_calls(), 1);
    }

    #[tokio::test]
    async fn create_validates_then_refreshes() {
        let (repo, actions) = setup().await;
        let bad = actions.create(CreateDebtInput { title: "TV".into(), amount: 10.0 }).await;
        assert!(matches!(bad, Err(ActionError::Validation(_))));
        let zero = actions.create(CreateDebtInput { title: "Televisor".into(), amount: 0.0 }).await;
        assert!(matches!(zero, Err(ActionError::Validation(_))));
        assert_eq!(repo.mutation_calls(), 0);

        let created = actions.create(CreateDebtInput { title: "  Televisor ".into(), amount: 2_500_000.0 }).await.unwrap();
        assert_eq!(created.title, "Televisor");
        actions.list().wait_idle().await;
        assert_eq!(actions.list().snapshot().len(), 3);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_collection_untouched() {
        let (repo, actions) = setup().await;
        repo.fail_mutations(true);
        let before = actions.list().snapshot();
        let target = before[0].clone();

        let err = actions.delete(&target).await.unwrap_err();
        assert_eq!(err.user_message("No fue posible eliminar la deuda."), "Error interno");
        assert!(!actions.list().is_loading());
        assert_eq!(actions.list().snapshot(), before);
        assert_eq!(repo.list_calls(), 1);
    }

    #[tokio::test]
    async fn edit_requires_a_change_and_valid_fields() {
        let (_, actions) = setup().await;
        let target = actions.list().snapshot()[0].clone();
        assert!(matches!(actions.edit(&target, UpdateDebtInput::default()).await, Err(ActionError::Validation(_))));
        let neg = UpdateDebtInput { title: None, amount: Some(-5.0) };
        assert!(matches!(actions.edit(&target, neg).await, Err(ActionError::Validation(_))));

        let ok = UpdateDebtInput { title: Some("Arriendo marzo".into()), amount: None };
        let updated = actions.edit(&target, ok).await.unwrap();
        assert_eq!(updated.title, "Arriendo marzo");
        assert_eq!(updated.amount, 1_000_000.0);
    }

    #[tokio::test]
    async fn delete_removes_after_refresh() {
        let (_, actions) = setup().await;
        let target = actions.list().snapshot()[0].clone();
        actions.delete(&target).await.unwrap();
        actions.list().wait_idle().await;
        assert!(actions.list().snapshot().iter().all(|d| d.id != target.id));
    }
}
