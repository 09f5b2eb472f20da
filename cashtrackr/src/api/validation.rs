//! Input validation producing structured field-level error lists.
//!
//! Validation never fails fast: every rule of every field is evaluated and
//! the complete error list is returned in one 400 response. Clients rely on
//! the exact set (an empty create-account body yields three errors, an empty
//! budget body four).
//!
//! [`ValidatedJson`] is the extractor handlers use: it deserializes the raw
//! payload type and converts it into its validated counterpart, so handler
//! bodies only ever see well-formed input ("parse, don't validate").

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::Error;

/// A single failed validation rule.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Field the rule applies to
    pub field: String,
    /// Human-readable rule message
    pub message: String,
}

/// Accumulated validation failures for one request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Finish validation: Ok(value) when no rule failed, the full list otherwise
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// A raw payload type that validates into its well-formed counterpart.
pub trait ValidateInput: Sized {
    /// The validated form handlers work with
    type Valid;

    /// Evaluate every rule and return either the validated value or the
    /// complete list of failures
    fn validate(self) -> Result<Self::Valid, ValidationErrors>;
}

/// JSON extractor that rejects with the accumulated field-error list.
///
/// Runs after any path/auth extractors in the handler signature, so body
/// validation is always the last pipeline stage.
pub struct ValidatedJson<T: ValidateInput>(pub T::Valid);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + ValidateInput,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await.map_err(|rejection| Error::BadRequest {
            message: rejection.body_text(),
        })?;

        let valid = payload.validate().map_err(Error::Validation)?;
        Ok(ValidatedJson(valid))
    }
}

/// Check that a string looks like an email address
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// A string field that must be present and non-blank
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Validate an amount field, recording every failed rule independently.
///
/// Three rules are evaluated the way the API's clients expect:
/// presence, numeric shape, and positivity. A missing amount fails all
/// three, a non-numeric one fails the latter two, a non-positive number
/// only the last. Accepts a JSON number or a numeric string.
pub(crate) fn validate_amount(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&Value>,
    empty_msg: &str,
    invalid_msg: &str,
    positive_msg: &str,
) -> Option<Decimal> {
    let value = match value {
        None | Some(Value::Null) => {
            errors.push(field, empty_msg);
            errors.push(field, invalid_msg);
            errors.push(field, positive_msg);
            return None;
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.push(field, empty_msg);
            errors.push(field, invalid_msg);
            errors.push(field, positive_msg);
            return None;
        }
        Some(v) => v,
    };

    let parsed = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };

    match parsed {
        Some(amount) if amount > Decimal::ZERO => Some(amount),
        Some(_) => {
            errors.push(field, positive_msg);
            None
        }
        None => {
            errors.push(field, invalid_msg);
            errors.push(field, positive_msg);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EMPTY: &str = "La cantidad no puede ir vacia";
    const INVALID: &str = "Cantidad no valida";
    const POSITIVE: &str = "Debe ser mayor a cero";

    fn amount_errors(value: Option<Value>) -> (Option<Decimal>, usize) {
        let mut errors = ValidationErrors::new();
        let parsed = validate_amount(&mut errors, "amount", value.as_ref(), EMPTY, INVALID, POSITIVE);
        (parsed, errors.len())
    }

    #[test]
    fn test_missing_amount_fails_all_three_rules() {
        assert_eq!(amount_errors(None), (None, 3));
        assert_eq!(amount_errors(Some(Value::Null)), (None, 3));
        assert_eq!(amount_errors(Some(json!(""))), (None, 3));
    }

    #[test]
    fn test_non_numeric_amount_fails_two_rules() {
        assert_eq!(amount_errors(Some(json!("abc"))), (None, 2));
        assert_eq!(amount_errors(Some(json!(true))), (None, 2));
        assert_eq!(amount_errors(Some(json!([1, 2]))), (None, 2));
    }

    #[test]
    fn test_non_positive_amount_fails_one_rule() {
        assert_eq!(amount_errors(Some(json!(0))), (None, 1));
        assert_eq!(amount_errors(Some(json!(-12.5))), (None, 1));
    }

    #[test]
    fn test_valid_amounts_parse() {
        let (parsed, count) = amount_errors(Some(json!(250.75)));
        assert_eq!(count, 0);
        assert_eq!(parsed, Some(Decimal::from_str("250.75").unwrap()));

        // Numeric strings are accepted the way clients send them
        let (parsed, count) = amount_errors(Some(json!("42")));
        assert_eq!(count, 0);
        assert_eq!(parsed, Some(Decimal::from_str("42").unwrap()));
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("test@test.com"));
        assert!(valid_email("user.name+tag@sub.example.co"));
        assert!(!valid_email("not_valid_email"));
        assert!(!valid_email("missing@tld"));
        assert!(!valid_email("spaces in@example.com"));
        assert!(!valid_email(""));
    }

    #[test]
    fn test_present() {
        assert_eq!(present(&Some("hola".to_string())), Some("hola"));
        assert_eq!(present(&Some("  hola  ".to_string())), Some("hola"));
        assert_eq!(present(&Some("   ".to_string())), None);
        assert_eq!(present(&None), None);
    }
}
