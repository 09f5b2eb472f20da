//! Test utilities: config, app, and user fixtures.

use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use sqlx::PgPool;

use crate::{
    auth::{password, session},
    config::{Config, EmailTransportConfig, PasswordConfig},
    db::models::users::UserDBResponse,
    types::UserId,
    AppState,
};

pub fn create_test_config() -> Config {
    // Use temp directory for test emails
    let temp_dir = std::env::temp_dir().join(format!("cashtrackr-test-emails-{}", std::process::id()));

    Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        auth: crate::config::AuthConfig {
            // Low-cost hashing keeps the test suite fast
            password: PasswordConfig {
                argon2_memory_kib: 8,
                argon2_iterations: 1,
                argon2_parallelism: 1,
            },
            ..Default::default()
        },
        email: crate::config::EmailConfig {
            transport: EmailTransportConfig::File {
                path: temp_dir.to_string_lossy().to_string(),
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn create_test_app(pool: PgPool) -> TestServer {
    let state = AppState::builder().db(pool).config(create_test_config()).build();
    let router = crate::build_router(state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Test app plus a capture of every opaque token the app issues
pub fn create_test_app_with_observer(pool: PgPool) -> (TestServer, Arc<Mutex<Vec<String>>>) {
    let captured: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    let state = AppState::builder()
        .db(pool)
        .config(create_test_config())
        .token_observer(Arc::new(move |token: &str| {
            sink.lock().expect("token capture lock poisoned").push(token.to_string());
        }) as crate::TokenObserver)
        .build();

    let router = crate::build_router(state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, captured)
}

/// Insert a user row directly, bypassing the registration flow
pub async fn insert_test_user(pool: &PgPool, email: &str, password_hash: &str, confirmed: bool, token: Option<&str>) -> UserDBResponse {
    sqlx::query_as::<_, UserDBResponse>(
        "INSERT INTO users (name, email, password_hash, confirmed, token)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, name, email, password_hash, confirmed, token, created_at, updated_at",
    )
    .bind("Test User")
    .bind(email)
    .bind(password_hash)
    .bind(confirmed)
    .bind(token)
    .fetch_one(pool)
    .await
    .expect("Failed to insert test user")
}

/// Insert a confirmed user with a real (low-cost) password hash
pub async fn create_confirmed_user(pool: &PgPool, email: &str, plain_password: &str) -> UserDBResponse {
    let params = password::Argon2Params {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
    let hash = password::hash_password_with_params(plain_password, Some(params)).expect("Failed to hash test password");
    insert_test_user(pool, email, &hash, true, None).await
}

/// Bearer header value for a user, signed with the test secret
pub fn bearer_for(user_id: UserId) -> String {
    let config = create_test_config();
    let token = session::create_session_token(user_id, &config).expect("Failed to create test session token");
    format!("Bearer {token}")
}
