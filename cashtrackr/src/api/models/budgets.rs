//! API models for budgets.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    api::{
        models::expenses::ExpenseResponse,
        validation::{present, validate_amount, ValidateInput, ValidationErrors},
    },
    db::models::budgets::BudgetDBResponse,
    types::{BudgetId, UserId},
};

/// Request body for creating or updating a budget.
///
/// The amount deserializes as raw JSON so validation can distinguish a
/// missing value from a non-numeric one and report every failed rule.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BudgetPayload {
    pub name: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Value>,
}

/// Validated budget input
#[derive(Debug, Clone)]
pub struct BudgetInput {
    pub name: String,
    pub amount: Decimal,
}

impl ValidateInput for BudgetPayload {
    type Valid = BudgetInput;

    fn validate(self) -> Result<BudgetInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = match present(&self.name) {
            Some(name) => name.to_string(),
            None => {
                errors.push("name", "El nombre del presupuesto no puede ir vacio");
                String::new()
            }
        };

        let amount = validate_amount(
            &mut errors,
            "amount",
            self.amount.as_ref(),
            "La cantidad del presupuesto no puede ir vacia",
            "Cantidad no valida",
            "El presupuesto debe ser mayor a cero",
        )
        .unwrap_or_default();

        errors.into_result(BudgetInput { name, amount })
    }
}

/// Full budget details returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BudgetResponse {
    pub id: BudgetId,
    pub name: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BudgetDBResponse> for BudgetResponse {
    fn from(db: BudgetDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            amount: db.amount,
            user_id: db.user_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// A budget with its expenses eagerly included (budget-by-id reads)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BudgetWithExpenses {
    #[serde(flatten)]
    pub budget: BudgetResponse,
    pub expenses: Vec<ExpenseResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_budget_body_has_exactly_four_errors() {
        let payload = BudgetPayload { name: None, amount: None };
        let errors = payload.validate().unwrap_err();
        // name presence + amount presence/numeric/positive
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_non_numeric_amount_has_three_errors() {
        let payload = BudgetPayload {
            name: None,
            amount: Some(json!("mucho")),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_zero_amount_single_error() {
        let payload = BudgetPayload {
            name: Some("Renta".to_string()),
            amount: Some(json!(0)),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].message, "El presupuesto debe ser mayor a cero");
    }

    #[test]
    fn test_valid_budget_input() {
        let payload = BudgetPayload {
            name: Some("Renta".to_string()),
            amount: Some(json!("4500.50")),
        };
        let valid = payload.validate().unwrap();
        assert_eq!(valid.name, "Renta");
        assert_eq!(valid.amount.to_string(), "4500.50");
    }
}
