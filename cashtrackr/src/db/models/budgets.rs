//! Database models for budgets.

use crate::types::{BudgetId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database request for creating a budget
#[derive(Debug, Clone)]
pub struct BudgetCreateDBRequest {
    pub name: String,
    pub amount: Decimal,
    pub user_id: UserId,
}

/// Database request for updating a budget. The owner is immutable.
#[derive(Debug, Clone)]
pub struct BudgetUpdateDBRequest {
    pub name: String,
    pub amount: Decimal,
}

/// Database response for a budget
#[derive(Debug, Clone, FromRow)]
pub struct BudgetDBResponse {
    pub id: BudgetId,
    pub name: String,
    pub amount: Decimal,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
