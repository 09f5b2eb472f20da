//! OpenAPI documentation, served at `/docs`.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::api::{
    models::{
        auth::{
            AccountTokenPayload, CheckPasswordPayload, CreateAccountPayload, ForgotPasswordPayload, LoginPayload,
            ResetPasswordPayload, UpdatePasswordPayload, UpdateProfilePayload,
        },
        budgets::{BudgetPayload, BudgetResponse, BudgetWithExpenses},
        expenses::{ExpensePayload, ExpenseResponse},
        users::CurrentUser,
    },
    validation::FieldError,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CashTrackr API",
        description = "Budget and expense tracking with a token-gated account lifecycle"
    ),
    paths(
        crate::api::handlers::auth::create_account,
        crate::api::handlers::auth::confirm_account,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::forgot_password,
        crate::api::handlers::auth::validate_token,
        crate::api::handlers::auth::reset_password,
        crate::api::handlers::auth::get_user,
        crate::api::handlers::auth::update_user,
        crate::api::handlers::auth::update_password,
        crate::api::handlers::auth::check_password,
        crate::api::handlers::budgets::list_budgets,
        crate::api::handlers::budgets::create_budget,
        crate::api::handlers::budgets::get_budget,
        crate::api::handlers::budgets::update_budget,
        crate::api::handlers::budgets::delete_budget,
        crate::api::handlers::expenses::create_expense,
        crate::api::handlers::expenses::get_expense,
        crate::api::handlers::expenses::update_expense,
        crate::api::handlers::expenses::delete_expense,
    ),
    components(schemas(
        CreateAccountPayload,
        LoginPayload,
        ForgotPasswordPayload,
        AccountTokenPayload,
        ResetPasswordPayload,
        UpdatePasswordPayload,
        CheckPasswordPayload,
        UpdateProfilePayload,
        BudgetPayload,
        BudgetResponse,
        BudgetWithExpenses,
        ExpensePayload,
        ExpenseResponse,
        CurrentUser,
        FieldError,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Account lifecycle and sessions"),
        (name = "budgets", description = "Owner-scoped budgets"),
        (name = "expenses", description = "Expenses nested under a budget"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}
