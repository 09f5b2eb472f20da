//! Extractor resolving a bearer credential to the authenticated user.
//!
//! No identity is ever attached without a valid session token; handlers that
//! take a [`CurrentUser`] argument cannot run unauthenticated.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::instrument;

use crate::{
    api::models::users::CurrentUser,
    auth::session,
    db::handlers::Users,
    errors::{Error, Result},
    AppState,
};

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or(Error::Unauthenticated { message: None })?;

        let bearer = header.to_str().map_err(|_| Error::Unauthenticated {
            message: Some("Token no valido".to_string()),
        })?;

        // Scheme-separated credential: "Bearer <token>"
        let token = match bearer.split_once(' ') {
            Some((_, token)) if !token.is_empty() => token,
            _ => {
                return Err(Error::Unauthenticated {
                    message: Some("Token no valido".to_string()),
                })
            }
        };

        let user_id = session::verify_session_token(token, &state.config)?;

        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut users = Users::new(&mut conn);
        let user = users
            .get_current(user_id)
            .await?
            .ok_or(Error::Unauthenticated { message: None })?;

        Ok(user)
    }
}
