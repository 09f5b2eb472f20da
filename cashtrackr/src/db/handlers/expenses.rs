//! Database repository for expenses.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::expenses::{ExpenseCreateDBRequest, ExpenseDBResponse, ExpenseUpdateDBRequest},
    },
    types::{BudgetId, ExpenseId},
};

const EXPENSE_COLUMNS: &str = "id, name, amount, budget_id, created_at, updated_at";

/// Filter for listing expenses: always scoped to a parent budget.
#[derive(Debug, Clone)]
pub struct ExpenseFilter {
    pub budget_id: BudgetId,
}

impl ExpenseFilter {
    pub fn for_budget(budget_id: BudgetId) -> Self {
        Self { budget_id }
    }
}

pub struct Expenses<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Expenses<'c> {
    type CreateRequest = ExpenseCreateDBRequest;
    type UpdateRequest = ExpenseUpdateDBRequest;
    type Response = ExpenseDBResponse;
    type Id = ExpenseId;
    type Filter = ExpenseFilter;

    #[instrument(skip(self, request), fields(budget_id = request.budget_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let expense = sqlx::query_as::<_, ExpenseDBResponse>(&format!(
            "INSERT INTO expenses (name, amount, budget_id)
             VALUES ($1, $2, $3)
             RETURNING {EXPENSE_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(request.amount)
        .bind(request.budget_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(expense)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let expense = sqlx::query_as::<_, ExpenseDBResponse>(&format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(expense)
    }

    #[instrument(skip(self, filter), fields(budget_id = filter.budget_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let expenses = sqlx::query_as::<_, ExpenseDBResponse>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE budget_id = $1 ORDER BY created_at DESC"
        ))
        .bind(filter.budget_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(expenses)
    }

    /// The parent budget (`budget_id`) is immutable: only name and amount change.
    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let expense = sqlx::query_as::<_, ExpenseDBResponse>(&format!(
            "UPDATE expenses SET name = $2, amount = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {EXPENSE_COLUMNS}"
        ))
        .bind(id)
        .bind(&request.name)
        .bind(request.amount)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(expense)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Expenses<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}
