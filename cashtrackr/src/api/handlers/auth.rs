//! Account lifecycle handlers: registration, confirmation, login,
//! password recovery, and profile maintenance.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{
        models::{
            auth::{
                AccountTokenPayload, CheckPasswordPayload, CreateAccountPayload, ForgotPasswordPayload, LoginPayload,
                ResetPasswordPayload, UpdatePasswordPayload, UpdateProfilePayload,
            },
            users::CurrentUser,
        },
        validation::{ValidatedJson, ValidationErrors},
    },
    auth::password::{self, Argon2Params},
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    email::EmailService,
    errors::{Error, Result},
    AppState,
};

const PASSWORD_MIN_LENGTH: usize = 8;

/// Hash a password on a blocking thread to avoid stalling the async runtime
async fn hash_password_blocking(state: &AppState, password: String) -> Result<String> {
    let params = Argon2Params::from(&state.config.auth.password);
    tokio::task::spawn_blocking(move || password::hash_password_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

/// Verify a password on a blocking thread to avoid stalling the async runtime
async fn verify_password_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })?
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/create-account",
    tag = "auth",
    request_body = CreateAccountPayload,
    responses(
        (status = 201, description = "Account created, confirmation email sent"),
        (status = 400, description = "Validation errors"),
        (status = 409, description = "Email already registered"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_account(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateAccountPayload>,
) -> Result<(StatusCode, Json<&'static str>)> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    if users.get_user_by_email(&request.email).await?.is_some() {
        return Err(Error::Conflict {
            message: "El usuario ya esta registrado".to_string(),
        });
    }

    let password_hash = hash_password_blocking(&state, request.password).await?;
    let token = password::generate_token();

    // Test hook replacing the product's global "last issued token" variable
    if let Some(observer) = &state.token_observer {
        observer(&token);
    }

    let user = users
        .create(&UserCreateDBRequest {
            name: request.name,
            email: request.email,
            password_hash,
            token: token.clone(),
        })
        .await?;

    let email_service = EmailService::new(&state.config)?;
    email_service.send_confirmation_email(&user.email, &user.name, &token).await?;

    Ok((StatusCode::CREATED, Json("Cuenta creada correctamente")))
}

/// Confirm an account with the emailed token
#[utoipa::path(
    post,
    path = "/api/auth/confirm-account",
    tag = "auth",
    request_body = AccountTokenPayload,
    responses(
        (status = 200, description = "Account confirmed"),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Unknown token"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn confirm_account(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AccountTokenPayload>,
) -> Result<Json<&'static str>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_user_by_token(&request.token).await?.ok_or(Error::InvalidToken)?;
    users.confirm_account(user.id).await?;

    Ok(Json("Cuenta confirmada correctamente"))
}

/// Log in with email and password, returning a session token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Session token", body = String),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Wrong password"),
        (status = 403, description = "Account not confirmed"),
        (status = 404, description = "No account for that email"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, ValidatedJson(request): ValidatedJson<LoginPayload>) -> Result<Json<String>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_user_by_email(&request.email).await?.ok_or_else(|| Error::NotFound {
        message: "El usuario no existe".to_string(),
    })?;

    // Confirmation gates login regardless of password correctness
    if !user.confirmed {
        return Err(Error::Forbidden {
            message: "Cuenta no ha sido confirmada".to_string(),
        });
    }

    let is_valid = verify_password_blocking(request.password, user.password_hash.clone()).await?;
    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Contraseña incorrecta".to_string()),
        });
    }

    let token = crate::auth::session::create_session_token(user.id, &state.config)?;
    Ok(Json(token))
}

/// Request a password reset token by email
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordPayload,
    responses(
        (status = 200, description = "Reset email sent"),
        (status = 400, description = "Validation errors"),
        (status = 404, description = "No account for that email"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ForgotPasswordPayload>,
) -> Result<Json<&'static str>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_user_by_email(&request.email).await?.ok_or_else(|| Error::NotFound {
        message: "El usuario no existe".to_string(),
    })?;

    // Reassign the opaque token: the user enters the reset-pending state
    let token = password::generate_token();
    if let Some(observer) = &state.token_observer {
        observer(&token);
    }
    users.assign_token(user.id, &token).await?;

    let email_service = EmailService::new(&state.config)?;
    email_service.send_password_reset_email(&user.email, &user.name, &token).await?;

    Ok(Json("Revisa tu email para instrucciones"))
}

/// Check that a reset token is usable without consuming it
#[utoipa::path(
    post,
    path = "/api/auth/validate-token",
    tag = "auth",
    request_body = AccountTokenPayload,
    responses(
        (status = 200, description = "Token is valid"),
        (status = 400, description = "Validation errors"),
        (status = 404, description = "Unknown token"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn validate_token(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AccountTokenPayload>,
) -> Result<Json<&'static str>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    users.get_user_by_token(&request.token).await?.ok_or_else(|| Error::NotFound {
        message: "Token no valido".to_string(),
    })?;

    Ok(Json("Token valido, asigna un nuevo password"))
}

/// Set a new password using a reset token from the path
#[utoipa::path(
    post,
    path = "/api/auth/reset-password/{token}",
    tag = "auth",
    request_body = ResetPasswordPayload,
    params(("token" = String, Path, description = "Reset token from the email")),
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Validation errors"),
        (status = 404, description = "Unknown token"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<Json<&'static str>> {
    // Path token and body password validate together so the client receives
    // the complete error list in one response
    let mut errors = ValidationErrors::new();
    if token.chars().count() != 6 {
        errors.push("token", "Token no valido");
    }
    let new_password = match payload.password {
        Some(password) if password.len() >= PASSWORD_MIN_LENGTH => password,
        _ => {
            errors.push("password", "El password es muy corto, minimo 8 caracteres");
            String::new()
        }
    };
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_user_by_token(&token).await?.ok_or_else(|| Error::NotFound {
        message: "Token no valido".to_string(),
    })?;

    let password_hash = hash_password_blocking(&state, new_password).await?;
    users.reset_password(user.id, &password_hash).await?;

    Ok(Json("El password se modifico correctamente"))
}

/// Return the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = "auth",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = CurrentUser),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}

/// Update the authenticated user's name and email
#[utoipa::path(
    put,
    path = "/api/auth/user",
    tag = "auth",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email belongs to another user"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<UpdateProfilePayload>,
) -> Result<Json<&'static str>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    // The new email may only belong to the user themselves
    if let Some(existing) = users.get_user_by_email(&request.email).await? {
        if existing.id != user.id {
            return Err(Error::Conflict {
                message: "Ese email ya esta registrado por otro usuario".to_string(),
            });
        }
    }

    users
        .update(
            user.id,
            &UserUpdateDBRequest {
                name: request.name,
                email: request.email,
            },
        )
        .await?;

    Ok(Json("Perfil actualizado correctamente"))
}

/// Change the authenticated user's password
#[utoipa::path(
    post,
    path = "/api/auth/update-password",
    tag = "auth",
    request_body = UpdatePasswordPayload,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Current password is wrong"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<UpdatePasswordPayload>,
) -> Result<Json<&'static str>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let db_user = users.get_by_id(user.id).await?.ok_or(Error::Unauthenticated { message: None })?;

    let is_valid = verify_password_blocking(request.current_password, db_user.password_hash.clone()).await?;
    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("El password actual es incorrecto".to_string()),
        });
    }

    let password_hash = hash_password_blocking(&state, request.password).await?;
    users.set_password(user.id, &password_hash).await?;

    Ok(Json("El password se modifico correctamente"))
}

/// Re-check the authenticated user's password
#[utoipa::path(
    post,
    path = "/api/auth/check-password",
    tag = "auth",
    request_body = CheckPasswordPayload,
    responses(
        (status = 200, description = "Password is correct"),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Password is wrong"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn check_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<CheckPasswordPayload>,
) -> Result<Json<&'static str>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let db_user = users.get_by_id(user.id).await?.ok_or(Error::Unauthenticated { message: None })?;

    let is_valid = verify_password_blocking(request.password, db_user.password_hash.clone()).await?;
    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("El password actual es incorrecto".to_string()),
        });
    }

    Ok(Json("Password Correcto"))
}
