//! # cashtrackr: Budget & Expense Tracking API
//!
//! `cashtrackr` is an HTTP API for personal budgeting: users register,
//! confirm their account with an emailed 6-digit code, authenticate with
//! signed session tokens, and manage budgets with nested expenses, each
//! scoped to the owning user.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for persistence.
//!
//! ### Request Flow
//!
//! An inbound request to a protected route passes through a fixed pipeline:
//! the bearer session token is verified and resolved to an identity
//! ([`auth::current_user`]), path identifiers are shape-validated, the
//! addressed resource is loaded, and ownership (budget) or linkage
//! (expense → budget) is enforced ([`api::pipeline`]). Only then is the
//! request body validated - accumulating every field error rather than
//! failing fast ([`api::validation`]) - before the handler runs. Handlers
//! trust the pipeline and never re-check authorization.
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) exposes the account lifecycle under
//! `/api/auth/*` and owner-scoped resources under `/api/budgets/*`.
//!
//! The **authentication layer** ([`auth`]) covers Argon2 password hashing,
//! 6-digit opaque tokens gating account confirmation and password resets,
//! and stateless signed session tokens.
//!
//! The **database layer** ([`db`]) uses the repository pattern: each entity
//! has a repository that owns its queries and returns plain model structs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use cashtrackr::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = cashtrackr::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     cashtrackr::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
mod email;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use axum::{
    http::{self, HeaderValue},
    routing::{get, post},
    Router,
};
use bon::Builder;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, instrument, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::config::CorsOrigin;
pub use config::Config;
pub use types::{BudgetId, ExpenseId, UserId};

/// Database migrations, embedded at compile time and run on startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Callback invoked with every issued opaque account token.
///
/// Tests install one to observe confirmation/reset codes instead of reading
/// a process-global; production leaves it unset.
pub type TokenObserver = Arc<dyn Fn(&str) + Send + Sync>;

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub token_observer: Option<TokenObserver>,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/create-account", post(api::handlers::auth::create_account))
        .route("/confirm-account", post(api::handlers::auth::confirm_account))
        .route("/login", post(api::handlers::auth::login))
        .route("/forgot-password", post(api::handlers::auth::forgot_password))
        .route("/validate-token", post(api::handlers::auth::validate_token))
        .route("/reset-password/{token}", post(api::handlers::auth::reset_password))
        .route(
            "/user",
            get(api::handlers::auth::get_user).put(api::handlers::auth::update_user),
        )
        .route("/update-password", post(api::handlers::auth::update_password))
        .route("/check-password", post(api::handlers::auth::check_password));

    let budget_routes = Router::new()
        .route(
            "/",
            get(api::handlers::budgets::list_budgets).post(api::handlers::budgets::create_budget),
        )
        .route(
            "/{budget_id}",
            get(api::handlers::budgets::get_budget)
                .put(api::handlers::budgets::update_budget)
                .delete(api::handlers::budgets::delete_budget),
        )
        .route("/{budget_id}/expenses", post(api::handlers::expenses::create_expense))
        .route(
            "/{budget_id}/expenses/{expense_id}",
            get(api::handlers::expenses::get_expense)
                .put(api::handlers::expenses::update_expense)
                .delete(api::handlers::expenses::delete_expense),
        );

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/budgets", budget_routes)
        .merge(Scalar::with_url("/docs", openapi::ApiDoc::openapi()))
        .with_state(state.clone());

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, and builds the router
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = PgPool::connect(&config.database_url).await?;
        MIGRATOR.run(&pool).await?;
        Self::with_pool(config, pool)
    }

    /// Build the application over an existing pool (migrations already run)
    pub fn with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("cashtrackr listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
