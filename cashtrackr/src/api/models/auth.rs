//! API request models for the account lifecycle.
//!
//! Validation messages are part of the wire contract and mirror what the
//! API's clients display verbatim.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::validation::{present, valid_email, ValidateInput, ValidationErrors};

const PASSWORD_MIN_LENGTH: usize = 8;

/// Request body for registering a new account
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAccountPayload {
    pub name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

/// Validated registration input
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub name: String,
    pub password: String,
    pub email: String,
}

impl ValidateInput for CreateAccountPayload {
    type Valid = CreateAccount;

    fn validate(self) -> Result<CreateAccount, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = match present(&self.name) {
            Some(name) => name.to_string(),
            None => {
                errors.push("name", "El nombre no puede ir vacio");
                String::new()
            }
        };

        let password = match &self.password {
            Some(password) if password.len() >= PASSWORD_MIN_LENGTH => password.clone(),
            _ => {
                errors.push("password", "El password es muy corto, minimo 8 caracteres");
                String::new()
            }
        };

        let email = match self.email.as_deref().filter(|e| valid_email(e)) {
            Some(email) => email.to_string(),
            None => {
                errors.push("email", "E-mail no valido");
                String::new()
            }
        };

        errors.into_result(CreateAccount { name, password, email })
    }
}

/// Request body for logging in
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated login input
#[derive(Debug, Clone)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl ValidateInput for LoginPayload {
    type Valid = Login;

    fn validate(self) -> Result<Login, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let email = match self.email.as_deref().filter(|e| valid_email(e)) {
            Some(email) => email.to_string(),
            None => {
                errors.push("email", "Email no valido");
                String::new()
            }
        };

        let password = match present(&self.password) {
            Some(password) => password.to_string(),
            None => {
                errors.push("password", "El password es obligatorio");
                String::new()
            }
        };

        errors.into_result(Login { email, password })
    }
}

/// Request body for requesting a password reset
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ForgotPasswordPayload {
    pub email: Option<String>,
}

/// Validated forgot-password input
#[derive(Debug, Clone)]
pub struct ForgotPassword {
    pub email: String,
}

impl ValidateInput for ForgotPasswordPayload {
    type Valid = ForgotPassword;

    fn validate(self) -> Result<ForgotPassword, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let email = match self.email.as_deref().filter(|e| valid_email(e)) {
            Some(email) => email.to_string(),
            None => {
                errors.push("email", "Email no valido");
                String::new()
            }
        };

        errors.into_result(ForgotPassword { email })
    }
}

/// Request body carrying an opaque account token (confirmation or reset
/// validation)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AccountTokenPayload {
    pub token: Option<String>,
}

/// Validated opaque token
#[derive(Debug, Clone)]
pub struct AccountToken {
    pub token: String,
}

impl ValidateInput for AccountTokenPayload {
    type Valid = AccountToken;

    fn validate(self) -> Result<AccountToken, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let token = match self.token.as_deref().filter(|t| t.chars().count() == 6) {
            Some(token) => token.to_string(),
            None => {
                errors.push("token", "Token no valido");
                String::new()
            }
        };

        errors.into_result(AccountToken { token })
    }
}

/// Request body for resetting a password with an emailed token (token itself
/// travels in the path and is validated alongside this body)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResetPasswordPayload {
    pub password: Option<String>,
}

/// Request body for changing the password of the authenticated user
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePasswordPayload {
    pub current_password: Option<String>,
    pub password: Option<String>,
}

/// Validated password-change input
#[derive(Debug, Clone)]
pub struct UpdatePassword {
    pub current_password: String,
    pub password: String,
}

impl ValidateInput for UpdatePasswordPayload {
    type Valid = UpdatePassword;

    fn validate(self) -> Result<UpdatePassword, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let current_password = match present(&self.current_password) {
            Some(current) => current.to_string(),
            None => {
                errors.push("current_password", "El password actual no puede ir vacio");
                String::new()
            }
        };

        let password = match &self.password {
            Some(password) if password.len() >= PASSWORD_MIN_LENGTH => password.clone(),
            _ => {
                errors.push("password", "El password nuevo es muy corto, minimo 8 caracteres");
                String::new()
            }
        };

        errors.into_result(UpdatePassword { current_password, password })
    }
}

/// Request body for re-checking the authenticated user's password
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckPasswordPayload {
    pub password: Option<String>,
}

/// Validated password-check input
#[derive(Debug, Clone)]
pub struct CheckPassword {
    pub password: String,
}

impl ValidateInput for CheckPasswordPayload {
    type Valid = CheckPassword;

    fn validate(self) -> Result<CheckPassword, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let password = match present(&self.password) {
            Some(password) => password.to_string(),
            None => {
                errors.push("password", "El password actual no puede ir vacio");
                String::new()
            }
        };

        errors.into_result(CheckPassword { password })
    }
}

/// Request body for updating the authenticated user's profile
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateProfilePayload {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Validated profile update
#[derive(Debug, Clone)]
pub struct UpdateProfile {
    pub name: String,
    pub email: String,
}

impl ValidateInput for UpdateProfilePayload {
    type Valid = UpdateProfile;

    fn validate(self) -> Result<UpdateProfile, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = match present(&self.name) {
            Some(name) => name.to_string(),
            None => {
                errors.push("name", "El nombre no puede ir vacio");
                String::new()
            }
        };

        let email = match self.email.as_deref().filter(|e| valid_email(e)) {
            Some(email) => email.to_string(),
            None => {
                errors.push("email", "E-mail no valido");
                String::new()
            }
        };

        errors.into_result(UpdateProfile { name, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_create_account_has_exactly_three_errors() {
        let payload = CreateAccountPayload {
            name: None,
            password: None,
            email: None,
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.len(), 3);

        let fields: Vec<&str> = errors.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "password", "email"]);
    }

    #[test]
    fn test_create_account_invalid_email_single_error() {
        let payload = CreateAccountPayload {
            name: Some("Juan".to_string()),
            password: Some("12345678".to_string()),
            email: Some("not_valid_email".to_string()),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].message, "E-mail no valido");
    }

    #[test]
    fn test_create_account_short_password_single_error() {
        let payload = CreateAccountPayload {
            name: Some("Juan".to_string()),
            password: Some("12345".to_string()),
            email: Some("test@test.com".to_string()),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].message, "El password es muy corto, minimo 8 caracteres");
    }

    #[test]
    fn test_valid_create_account() {
        let payload = CreateAccountPayload {
            name: Some("Juan".to_string()),
            password: Some("password23".to_string()),
            email: Some("test@test.com".to_string()),
        };
        let valid = payload.validate().unwrap();
        assert_eq!(valid.name, "Juan");
        assert_eq!(valid.email, "test@test.com");
    }

    #[test]
    fn test_empty_login_has_exactly_two_errors() {
        let payload = LoginPayload {
            email: None,
            password: None,
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_token_must_be_six_characters() {
        for token in [None, Some("not_valid".to_string()), Some("12345".to_string())] {
            let payload = AccountTokenPayload { token };
            let errors = payload.validate().unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.errors[0].message, "Token no valido");
        }

        let payload = AccountTokenPayload {
            token: Some("123456".to_string()),
        };
        assert_eq!(payload.validate().unwrap().token, "123456");
    }

    #[test]
    fn test_update_password_rules() {
        let payload = UpdatePasswordPayload {
            current_password: None,
            password: Some("short".to_string()),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
