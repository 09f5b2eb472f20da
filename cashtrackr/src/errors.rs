use crate::api::validation::ValidationErrors;
use crate::db::errors::DbError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided, or credential rejected
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Opaque account token did not match any user awaiting a transition
    #[error("Invalid account token")]
    InvalidToken,

    /// Session token failed signature/expiry verification.
    ///
    /// Surfaced as a 500 rather than a 401: clients of the original API
    /// observe this status and it is kept as-is (see DESIGN.md).
    #[error("Session token rejected")]
    SessionRejected,

    /// Authenticated identity is not the owner of the requested budget
    #[error("Not the owner of the requested resource")]
    OwnershipDenied,

    /// Expense does not belong to the already-authorized budget
    #[error("Resource does not belong to its claimed parent")]
    LinkageDenied,

    /// Operation refused for the authenticated identity
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Request body failed input validation; carries the complete field list
    #[error("Invalid input")]
    Validation(ValidationErrors),

    /// Invalid request data outside the field-validation path
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{message}")]
    NotFound { message: String },

    /// Conflict, e.g. duplicate email on registration
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::SessionRejected => StatusCode::INTERNAL_SERVER_ERROR,
            Error::OwnershipDenied => StatusCode::UNAUTHORIZED,
            Error::LinkageDenied => StatusCode::FORBIDDEN,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "No autorizado".to_string()),
            Error::InvalidToken => "Token no valido".to_string(),
            Error::SessionRejected => "Token no valido".to_string(),
            Error::OwnershipDenied | Error::LinkageDenied => "Accion no valida".to_string(),
            Error::Forbidden { message } => message.clone(),
            Error::Validation(_) => "Datos no validos".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { message } => message.clone(),
            Error::Conflict { message } => message.clone(),
            Error::Internal { .. } => "Hubo un error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "No encontrado".to_string(),
                DbError::UniqueViolation { constraint, table, .. } => {
                    // Friendly wording for the constraints clients actually hit
                    match (table.as_deref(), constraint.as_deref()) {
                        (Some("users"), Some(c)) if c.contains("email") => "El usuario ya esta registrado".to_string(),
                        _ => "El recurso ya existe".to_string(),
                    }
                }
                DbError::ForeignKeyViolation { .. } => "Referencia no valida".to_string(),
                DbError::CheckViolation { .. } => "Datos no validos".to_string(),
                DbError::Other(_) => "Hubo un error".to_string(),
            },
            Error::Other(_) => "Hubo un error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) | Error::SessionRejected => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::InvalidToken | Error::OwnershipDenied | Error::LinkageDenied | Error::Forbidden { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Validation(_) | Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
            Error::Conflict { .. } => {
                tracing::warn!("Conflict error: {}", self);
            }
        }

        let status = self.status_code();

        match &self {
            // Validation failures return the complete accumulated field list
            Error::Validation(errors) => (status, axum::response::Json(json!({ "errors": errors.errors }))).into_response(),
            _ => {
                let body = json!({ "error": self.user_message() });
                (status, axum::response::Json(body)).into_response()
            }
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
