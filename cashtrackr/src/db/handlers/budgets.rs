//! Database repository for budgets.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::budgets::{BudgetCreateDBRequest, BudgetDBResponse, BudgetUpdateDBRequest},
    },
    types::{BudgetId, UserId},
};

const BUDGET_COLUMNS: &str = "id, name, amount, user_id, created_at, updated_at";

/// Filter for listing budgets: always scoped to an owner.
#[derive(Debug, Clone)]
pub struct BudgetFilter {
    pub user_id: UserId,
}

impl BudgetFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self { user_id }
    }
}

pub struct Budgets<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Budgets<'c> {
    type CreateRequest = BudgetCreateDBRequest;
    type UpdateRequest = BudgetUpdateDBRequest;
    type Response = BudgetDBResponse;
    type Id = BudgetId;
    type Filter = BudgetFilter;

    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let budget = sqlx::query_as::<_, BudgetDBResponse>(&format!(
            "INSERT INTO budgets (name, amount, user_id)
             VALUES ($1, $2, $3)
             RETURNING {BUDGET_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(request.amount)
        .bind(request.user_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(budget)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let budget = sqlx::query_as::<_, BudgetDBResponse>(&format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(budget)
    }

    #[instrument(skip(self, filter), fields(user_id = filter.user_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let budgets = sqlx::query_as::<_, BudgetDBResponse>(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(filter.user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(budgets)
    }

    /// The owner (`user_id`) is immutable: only name and amount change.
    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let budget = sqlx::query_as::<_, BudgetDBResponse>(&format!(
            "UPDATE budgets SET name = $2, amount = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {BUDGET_COLUMNS}"
        ))
        .bind(id)
        .bind(&request.name)
        .bind(request.amount)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(budget)
    }

    /// Deleting a budget cascades to its expenses (ON DELETE CASCADE).
    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Budgets<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::expenses::{ExpenseFilter, Expenses};
    use crate::db::models::expenses::ExpenseCreateDBRequest;
    use crate::test_utils::insert_test_user;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn test_create_then_read_round_trips(pool: PgPool) {
        let user = insert_test_user(&pool, "test@test.com", "hash", true, None).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Budgets::new(&mut conn);

        let created = repo
            .create(&BudgetCreateDBRequest {
                name: "Vacaciones".to_string(),
                amount: Decimal::new(30000, 1), // 3000.0
                user_id: user.id,
            })
            .await
            .unwrap();

        let read = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(read.name, "Vacaciones");
        assert_eq!(read.amount, Decimal::new(30000, 1));
        assert_eq!(read.user_id, user.id);
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn test_list_is_scoped_to_owner_newest_first(pool: PgPool) {
        let alice = insert_test_user(&pool, "alice@test.com", "hash", true, None).await;
        let bob = insert_test_user(&pool, "bob@test.com", "hash", true, None).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Budgets::new(&mut conn);

        for name in ["Despensa", "Renta"] {
            repo.create(&BudgetCreateDBRequest {
                name: name.to_string(),
                amount: Decimal::new(100, 0),
                user_id: alice.id,
            })
            .await
            .unwrap();
        }
        repo.create(&BudgetCreateDBRequest {
            name: "Ajeno".to_string(),
            amount: Decimal::new(100, 0),
            user_id: bob.id,
        })
        .await
        .unwrap();

        let budgets = repo.list(&BudgetFilter::for_user(alice.id)).await.unwrap();
        assert_eq!(budgets.len(), 2);
        assert!(budgets.iter().all(|b| b.user_id == alice.id));
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn test_delete_cascades_to_expenses(pool: PgPool) {
        let user = insert_test_user(&pool, "test@test.com", "hash", true, None).await;

        let mut conn = pool.acquire().await.unwrap();
        let budget = {
            let mut repo = Budgets::new(&mut conn);
            repo.create(&BudgetCreateDBRequest {
                name: "Hogar".to_string(),
                amount: Decimal::new(5000, 0),
                user_id: user.id,
            })
            .await
            .unwrap()
        };

        let expense = {
            let mut expenses = Expenses::new(&mut conn);
            expenses
                .create(&ExpenseCreateDBRequest {
                    name: "Luz".to_string(),
                    amount: Decimal::new(350, 0),
                    budget_id: budget.id,
                })
                .await
                .unwrap()
        };

        {
            let mut repo = Budgets::new(&mut conn);
            assert!(repo.delete(budget.id).await.unwrap());
        }

        let mut expenses = Expenses::new(&mut conn);
        assert!(expenses.get_by_id(expense.id).await.unwrap().is_none());
        assert!(expenses.list(&ExpenseFilter::for_budget(budget.id)).await.unwrap().is_empty());
    }
}
