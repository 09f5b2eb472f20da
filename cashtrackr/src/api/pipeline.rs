//! The per-route resource pipeline: identifier validation, existence load,
//! and ownership/linkage guards, composed as typed extractors.
//!
//! Ordering is fixed: authentication precedes resource loading precedes the
//! ownership check precedes body validation - later stages depend on state
//! established earlier. Each stage yields a context struct, so a handler
//! taking [`OwnedBudget`] statically carries the guarantee that the budget
//! exists and belongs to the authenticated user, and one taking
//! [`LinkedExpense`] additionally that the expense belongs to that budget.
//! Handlers never re-check authorization.

use axum::extract::{FromRequestParts, RawPathParams};
use axum::http::request::Parts;
use tracing::instrument;

use crate::{
    api::{models::users::CurrentUser, validation::ValidationErrors},
    db::{
        handlers::{Budgets, Expenses, Repository},
        models::{budgets::BudgetDBResponse, expenses::ExpenseDBResponse},
    },
    errors::{Error, Result},
    AppState,
};

/// Parse a path parameter as a positive integer id.
///
/// Shape failures are reported as structured validation errors and never
/// reach the loader.
fn path_id(params: &RawPathParams, name: &str, message: &str) -> Result<i64> {
    let raw = params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .ok_or_else(|| Error::Internal {
            operation: format!("route is missing the {name} path parameter"),
        })?;

    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Error::Validation(ValidationErrors::single(name, message)))
}

/// Context for a route scoped to a budget: the authenticated user together
/// with a budget they are guaranteed to own.
#[derive(Debug, Clone)]
pub struct OwnedBudget {
    pub user: CurrentUser,
    pub budget: BudgetDBResponse,
}

impl FromRequestParts<AppState> for OwnedBudget {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Authentication first: nothing downstream runs without an identity
        let user = CurrentUser::from_request_parts(parts, state).await?;

        let params = RawPathParams::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::Internal {
                operation: format!("read path parameters: {e}"),
            })?;
        let budget_id = path_id(&params, "budget_id", "ID no valido")?;

        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut budgets = Budgets::new(&mut conn);
        let budget = budgets.get_by_id(budget_id).await?.ok_or_else(|| Error::NotFound {
            message: "Presupuesto no encontrado".to_string(),
        })?;

        // Ownership guard: the recorded owner must be the session identity
        if budget.user_id != user.id {
            return Err(Error::OwnershipDenied);
        }

        Ok(Self { user, budget })
    }
}

/// Context for a route scoped to an expense inside a budget: everything in
/// [`OwnedBudget`], plus an expense guaranteed to belong to that budget.
#[derive(Debug, Clone)]
pub struct LinkedExpense {
    pub user: CurrentUser,
    pub budget: BudgetDBResponse,
    pub expense: ExpenseDBResponse,
}

impl FromRequestParts<AppState> for LinkedExpense {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let OwnedBudget { user, budget } = OwnedBudget::from_request_parts(parts, state).await?;

        let params = RawPathParams::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::Internal {
                operation: format!("read path parameters: {e}"),
            })?;
        let expense_id = path_id(&params, "expense_id", "Id no valido")?;

        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut expenses = Expenses::new(&mut conn);
        let expense = expenses.get_by_id(expense_id).await?.ok_or_else(|| Error::NotFound {
            message: "Gasto no encontrado".to_string(),
        })?;

        // Linkage guard: the expense's recorded parent must be the budget the
        // ownership check already authorized - ownership is not re-derived
        if expense.budget_id != budget.id {
            return Err(Error::LinkageDenied);
        }

        Ok(Self { user, budget, expense })
    }
}
