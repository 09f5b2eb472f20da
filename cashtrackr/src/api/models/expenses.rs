//! API models for expenses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    api::validation::{present, validate_amount, ValidateInput, ValidationErrors},
    db::models::expenses::ExpenseDBResponse,
    types::{BudgetId, ExpenseId},
};

/// Request body for creating or updating an expense
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExpensePayload {
    pub name: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Value>,
}

/// Validated expense input
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub name: String,
    pub amount: Decimal,
}

impl ValidateInput for ExpensePayload {
    type Valid = ExpenseInput;

    fn validate(self) -> Result<ExpenseInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = match present(&self.name) {
            Some(name) => name.to_string(),
            None => {
                errors.push("name", "El nombre del gasto no puede ir vacio");
                String::new()
            }
        };

        let amount = validate_amount(
            &mut errors,
            "amount",
            self.amount.as_ref(),
            "La cantidad del gasto no puede ir vacia",
            "Cantidad no valida",
            "El gasto debe ser mayor a cero",
        )
        .unwrap_or_default();

        errors.into_result(ExpenseInput { name, amount })
    }
}

/// Full expense details returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpenseResponse {
    pub id: ExpenseId,
    pub name: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub budget_id: BudgetId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExpenseDBResponse> for ExpenseResponse {
    fn from(db: ExpenseDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            amount: db.amount,
            budget_id: db.budget_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_expense_body_has_exactly_four_errors() {
        let payload = ExpensePayload { name: None, amount: None };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_expense_messages_use_expense_wording() {
        let payload = ExpensePayload {
            name: None,
            amount: Some(json!(-1)),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.errors[0].message, "El nombre del gasto no puede ir vacio");
        assert_eq!(errors.errors[1].message, "El gasto debe ser mayor a cero");
    }

    #[test]
    fn test_valid_expense_input() {
        let payload = ExpensePayload {
            name: Some("Luz".to_string()),
            amount: Some(json!(350)),
        };
        let valid = payload.validate().unwrap();
        assert_eq!(valid.name, "Luz");
        assert_eq!(valid.amount, Decimal::new(350, 0));
    }
}
