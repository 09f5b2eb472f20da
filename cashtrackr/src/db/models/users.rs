//! Database models for users.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new user.
///
/// Users are always created unconfirmed, carrying a fresh confirmation token.
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub token: String,
}

/// Database request for updating a user's profile
#[derive(Debug, Clone)]
pub struct UserUpdateDBRequest {
    pub name: String,
    pub email: String,
}

/// Database response for a user
#[derive(Debug, Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub confirmed: bool,
    /// Single-purpose opaque token: present only while the user awaits
    /// confirmation or a password reset
    pub token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
