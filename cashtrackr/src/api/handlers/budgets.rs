//! Budget handlers: thin orchestration over the resource pipeline.
//!
//! Every handler here trusts the pipeline invariant - by the time a body
//! runs, the budget (when present) is loaded and owned by the session
//! identity. Nothing re-checks authorization.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::{
        models::{
            budgets::{BudgetPayload, BudgetResponse, BudgetWithExpenses},
            users::CurrentUser,
        },
        pipeline::OwnedBudget,
        validation::ValidatedJson,
    },
    db::{
        handlers::{budgets::BudgetFilter, expenses::ExpenseFilter, Budgets, Expenses, Repository},
        models::budgets::{BudgetCreateDBRequest, BudgetUpdateDBRequest},
    },
    errors::{Error, Result},
    AppState,
};

/// List the authenticated user's budgets, newest first
#[utoipa::path(
    get,
    path = "/api/budgets",
    tag = "budgets",
    responses(
        (status = 200, description = "Budgets of the authenticated user", body = Vec<BudgetResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_budgets(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<BudgetResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut budgets = Budgets::new(&mut conn);

    let budgets = budgets.list(&BudgetFilter::for_user(user.id)).await?;
    Ok(Json(budgets.into_iter().map(BudgetResponse::from).collect()))
}

/// Create a budget owned by the authenticated user
#[utoipa::path(
    post,
    path = "/api/budgets",
    tag = "budgets",
    request_body = BudgetPayload,
    responses(
        (status = 201, description = "Budget created"),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_budget(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<BudgetPayload>,
) -> Result<(StatusCode, Json<&'static str>)> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut budgets = Budgets::new(&mut conn);

    // The owner is always the session identity, never client input
    budgets
        .create(&BudgetCreateDBRequest {
            name: input.name,
            amount: input.amount,
            user_id: user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json("Presupuesto creado correctamente")))
}

/// Get a budget with its expenses
#[utoipa::path(
    get,
    path = "/api/budgets/{budget_id}",
    tag = "budgets",
    params(("budget_id" = i64, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Budget with its expenses", body = BudgetWithExpenses),
        (status = 400, description = "Invalid budget id"),
        (status = 401, description = "Unauthorized or not the owner"),
        (status = 404, description = "Budget not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_budget(State(state): State<AppState>, OwnedBudget { budget, .. }: OwnedBudget) -> Result<Json<BudgetWithExpenses>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut expenses = Expenses::new(&mut conn);

    let expenses = expenses.list(&ExpenseFilter::for_budget(budget.id)).await?;

    Ok(Json(BudgetWithExpenses {
        budget: BudgetResponse::from(budget),
        expenses: expenses.into_iter().map(Into::into).collect(),
    }))
}

/// Update a budget's name and amount
#[utoipa::path(
    put,
    path = "/api/budgets/{budget_id}",
    tag = "budgets",
    request_body = BudgetPayload,
    params(("budget_id" = i64, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Budget updated"),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Unauthorized or not the owner"),
        (status = 404, description = "Budget not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_budget(
    State(state): State<AppState>,
    OwnedBudget { budget, .. }: OwnedBudget,
    ValidatedJson(input): ValidatedJson<BudgetPayload>,
) -> Result<Json<&'static str>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut budgets = Budgets::new(&mut conn);

    budgets
        .update(
            budget.id,
            &BudgetUpdateDBRequest {
                name: input.name,
                amount: input.amount,
            },
        )
        .await?;

    Ok(Json("Presupuesto actualizado correctamente"))
}

/// Delete a budget and all of its expenses
#[utoipa::path(
    delete,
    path = "/api/budgets/{budget_id}",
    tag = "budgets",
    params(("budget_id" = i64, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Budget and its expenses deleted"),
        (status = 401, description = "Unauthorized or not the owner"),
        (status = 404, description = "Budget not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_budget(State(state): State<AppState>, OwnedBudget { budget, .. }: OwnedBudget) -> Result<Json<&'static str>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut budgets = Budgets::new(&mut conn);

    budgets.delete(budget.id).await?;

    Ok(Json("Presupuesto eliminado correctamente"))
}
