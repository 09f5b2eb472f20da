//! API models for users.

use crate::types::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The authenticated identity attached to a request: a bounded projection
/// of the user row (never the password hash or token).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
}
