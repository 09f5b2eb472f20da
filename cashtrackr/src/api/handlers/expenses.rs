//! Expense handlers, nested under an owned budget.
//!
//! Creation only requires the owned parent budget; reads, updates, and
//! deletes additionally require the budget/expense linkage, which the
//! [`LinkedExpense`] extractor already verified.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::{
        models::expenses::{ExpensePayload, ExpenseResponse},
        pipeline::{LinkedExpense, OwnedBudget},
        validation::ValidatedJson,
    },
    db::{
        handlers::{Expenses, Repository},
        models::expenses::{ExpenseCreateDBRequest, ExpenseUpdateDBRequest},
    },
    errors::{Error, Result},
    AppState,
};

/// Add an expense to a budget
#[utoipa::path(
    post,
    path = "/api/budgets/{budget_id}/expenses",
    tag = "expenses",
    request_body = ExpensePayload,
    params(("budget_id" = i64, Path, description = "Budget ID")),
    responses(
        (status = 201, description = "Expense created"),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Unauthorized or not the owner"),
        (status = 404, description = "Budget not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_expense(
    State(state): State<AppState>,
    OwnedBudget { budget, .. }: OwnedBudget,
    ValidatedJson(input): ValidatedJson<ExpensePayload>,
) -> Result<(StatusCode, Json<&'static str>)> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut expenses = Expenses::new(&mut conn);

    // The parent is the already-authorized budget, never client input
    expenses
        .create(&ExpenseCreateDBRequest {
            name: input.name,
            amount: input.amount,
            budget_id: budget.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json("Gasto agregado correctamente")))
}

/// Get an expense
#[utoipa::path(
    get,
    path = "/api/budgets/{budget_id}/expenses/{expense_id}",
    tag = "expenses",
    params(
        ("budget_id" = i64, Path, description = "Budget ID"),
        ("expense_id" = i64, Path, description = "Expense ID"),
    ),
    responses(
        (status = 200, description = "Expense details", body = ExpenseResponse),
        (status = 401, description = "Unauthorized or not the owner"),
        (status = 403, description = "Expense does not belong to the budget"),
        (status = 404, description = "Budget or expense not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_expense(LinkedExpense { expense, .. }: LinkedExpense) -> Json<ExpenseResponse> {
    Json(ExpenseResponse::from(expense))
}

/// Update an expense's name and amount
#[utoipa::path(
    put,
    path = "/api/budgets/{budget_id}/expenses/{expense_id}",
    tag = "expenses",
    request_body = ExpensePayload,
    params(
        ("budget_id" = i64, Path, description = "Budget ID"),
        ("expense_id" = i64, Path, description = "Expense ID"),
    ),
    responses(
        (status = 200, description = "Expense updated"),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Unauthorized or not the owner"),
        (status = 403, description = "Expense does not belong to the budget"),
        (status = 404, description = "Budget or expense not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_expense(
    State(state): State<AppState>,
    LinkedExpense { expense, .. }: LinkedExpense,
    ValidatedJson(input): ValidatedJson<ExpensePayload>,
) -> Result<Json<&'static str>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut expenses = Expenses::new(&mut conn);

    expenses
        .update(
            expense.id,
            &ExpenseUpdateDBRequest {
                name: input.name,
                amount: input.amount,
            },
        )
        .await?;

    Ok(Json("Se actualizo correctamente"))
}

/// Delete an expense
#[utoipa::path(
    delete,
    path = "/api/budgets/{budget_id}/expenses/{expense_id}",
    tag = "expenses",
    params(
        ("budget_id" = i64, Path, description = "Budget ID"),
        ("expense_id" = i64, Path, description = "Expense ID"),
    ),
    responses(
        (status = 200, description = "Expense deleted"),
        (status = 401, description = "Unauthorized or not the owner"),
        (status = 403, description = "Expense does not belong to the budget"),
        (status = 404, description = "Budget or expense not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_expense(State(state): State<AppState>, LinkedExpense { expense, .. }: LinkedExpense) -> Result<Json<&'static str>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut expenses = Expenses::new(&mut conn);

    expenses.delete(expense.id).await?;

    Ok(Json("Gasto eliminado"))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{bearer_for, create_confirmed_user, create_test_app};
    use serde_json::{json, Value};
    use sqlx::PgPool;

    async fn create_budget(server: &axum_test::TestServer, auth: &str, name: &str, amount: i64) -> i64 {
        server
            .post("/api/budgets")
            .add_header("authorization", auth.to_string())
            .json(&json!({"name": name, "amount": amount}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let budgets: Value = server
            .get("/api/budgets")
            .add_header("authorization", auth.to_string())
            .await
            .json();
        budgets
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["name"] == name)
            .and_then(|b| b["id"].as_i64())
            .expect("created budget should be listed")
    }

    async fn create_expense(server: &axum_test::TestServer, auth: &str, budget_id: i64, name: &str, amount: f64) -> i64 {
        server
            .post(&format!("/api/budgets/{budget_id}/expenses"))
            .add_header("authorization", auth.to_string())
            .json(&json!({"name": name, "amount": amount}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let budget: Value = server
            .get(&format!("/api/budgets/{budget_id}"))
            .add_header("authorization", auth.to_string())
            .await
            .json();
        budget["expenses"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["name"] == name)
            .and_then(|e| e["id"].as_i64())
            .expect("created expense should be included in the budget")
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    #[test_log::test]
    async fn test_expense_create_then_read_round_trips(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_confirmed_user(&pool, "test@test.com", "password23").await;
        let auth = bearer_for(user.id);

        let budget_id = create_budget(&server, &auth, "Hogar", 5000).await;

        let response = server
            .post(&format!("/api/budgets/{budget_id}/expenses"))
            .add_header("authorization", auth.clone())
            .json(&json!({"name": "Luz", "amount": 350}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        assert_eq!(response.json::<Value>(), json!("Gasto agregado correctamente"));

        let budget: Value = server
            .get(&format!("/api/budgets/{budget_id}"))
            .add_header("authorization", auth.clone())
            .await
            .json();
        let expenses = budget["expenses"].as_array().unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0]["name"], "Luz");
        assert_eq!(expenses[0]["budget_id"].as_i64().unwrap(), budget_id);

        let expense_id = expenses[0]["id"].as_i64().unwrap();
        let response = server
            .get(&format!("/api/budgets/{budget_id}/expenses/{expense_id}"))
            .add_header("authorization", auth)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["name"], "Luz");
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn test_expense_body_validation_has_four_errors_when_empty(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_confirmed_user(&pool, "test@test.com", "password23").await;
        let auth = bearer_for(user.id);

        let budget_id = create_budget(&server, &auth, "Hogar", 5000).await;

        let response = server
            .post(&format!("/api/budgets/{budget_id}/expenses"))
            .add_header("authorization", auth)
            .json(&json!({}))
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["errors"].as_array().unwrap().len(), 4);
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn test_expense_id_shape_is_validated(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_confirmed_user(&pool, "test@test.com", "password23").await;
        let auth = bearer_for(user.id);

        let budget_id = create_budget(&server, &auth, "Hogar", 5000).await;

        let response = server
            .get(&format!("/api/budgets/{budget_id}/expenses/not_valid"))
            .add_header("authorization", auth)
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["message"], "Id no valido");
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn test_missing_expense_is_not_found(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_confirmed_user(&pool, "test@test.com", "password23").await;
        let auth = bearer_for(user.id);

        let budget_id = create_budget(&server, &auth, "Hogar", 5000).await;

        let response = server
            .get(&format!("/api/budgets/{budget_id}/expenses/9999"))
            .add_header("authorization", auth)
            .await;
        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["error"], "Gasto no encontrado");
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn test_expense_must_belong_to_the_addressed_budget(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_confirmed_user(&pool, "test@test.com", "password23").await;
        let auth = bearer_for(user.id);

        let budget_a = create_budget(&server, &auth, "Hogar", 5000).await;
        let budget_b = create_budget(&server, &auth, "Viajes", 8000).await;
        let expense_in_a = create_expense(&server, &auth, budget_a, "Luz", 350.0).await;

        // Both budgets belong to the user; the linkage check alone rejects this
        let response = server
            .get(&format!("/api/budgets/{budget_b}/expenses/{expense_in_a}"))
            .add_header("authorization", auth)
            .await;
        response.assert_status_forbidden();
        assert_eq!(response.json::<Value>()["error"], "Accion no valida");
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn test_update_and_delete_expense(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_confirmed_user(&pool, "test@test.com", "password23").await;
        let auth = bearer_for(user.id);

        let budget_id = create_budget(&server, &auth, "Hogar", 5000).await;
        let expense_id = create_expense(&server, &auth, budget_id, "Luz", 350.0).await;

        let response = server
            .put(&format!("/api/budgets/{budget_id}/expenses/{expense_id}"))
            .add_header("authorization", auth.clone())
            .json(&json!({"name": "Luz y gas", "amount": 520}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!("Se actualizo correctamente"));

        let expense: Value = server
            .get(&format!("/api/budgets/{budget_id}/expenses/{expense_id}"))
            .add_header("authorization", auth.clone())
            .await
            .json();
        assert_eq!(expense["name"], "Luz y gas");

        let response = server
            .delete(&format!("/api/budgets/{budget_id}/expenses/{expense_id}"))
            .add_header("authorization", auth.clone())
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!("Gasto eliminado"));

        server
            .get(&format!("/api/budgets/{budget_id}/expenses/{expense_id}"))
            .add_header("authorization", auth)
            .await
            .assert_status_not_found();
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    async fn test_deleting_a_budget_cascades_to_expenses(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_confirmed_user(&pool, "test@test.com", "password23").await;
        let auth = bearer_for(user.id);

        let budget_id = create_budget(&server, &auth, "Hogar", 5000).await;
        let expense_id = create_expense(&server, &auth, budget_id, "Luz", 350.0).await;

        server
            .delete(&format!("/api/budgets/{budget_id}"))
            .add_header("authorization", auth.clone())
            .await
            .assert_status_ok();

        // The former expense is unreachable and its row is gone
        server
            .get(&format!("/api/budgets/{budget_id}/expenses/{expense_id}"))
            .add_header("authorization", auth)
            .await
            .assert_status_not_found();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM expenses WHERE id = $1")
            .bind(expense_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
