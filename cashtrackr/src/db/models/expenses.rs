//! Database models for expenses.

use crate::types::{BudgetId, ExpenseId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database request for creating an expense under a budget
#[derive(Debug, Clone)]
pub struct ExpenseCreateDBRequest {
    pub name: String,
    pub amount: Decimal,
    pub budget_id: BudgetId,
}

/// Database request for updating an expense. The parent budget is immutable.
#[derive(Debug, Clone)]
pub struct ExpenseUpdateDBRequest {
    pub name: String,
    pub amount: Decimal,
}

/// Database response for an expense
#[derive(Debug, Clone, FromRow)]
pub struct ExpenseDBResponse {
    pub id: ExpenseId,
    pub name: String,
    pub amount: Decimal,
    pub budget_id: BudgetId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
