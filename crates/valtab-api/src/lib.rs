//! # valtab-api — Axum Service for Statutory Valuation Tables
//!
//! Thin HTTP surface around the update cycle in `valtab-update`.
//!
//! ## API Surface
//!
//! | Route                            | Module                | Auth   |
//! |----------------------------------|-----------------------|--------|
//! | `POST /api/cron/update-tax-data` | [`routes::cron`]      | Bearer |
//! | `GET /v1/history`                | [`routes::history`]   | Bearer |
//! | `GET /v1/status`                 | [`routes::history`]   | Bearer |
//! | `GET /openapi.json`              | [`openapi`]           | Bearer |
//! | `GET /health/liveness`           | here                  | none   |
//! | `GET /health/readiness`          | here                  | none   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware (matched routes only) → Handler
//! ```
//!
//! Auth is a route layer, so an unknown path answers 404 and a wrong method
//! answers 405 without consulting the secret.

pub mod auth;
pub mod db;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::auth::SharedSecret;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware so
/// they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let secret = SharedSecret::new(state.config.cron_secret.clone());

    let api = Router::new()
        .merge(routes::cron::router())
        .merge(routes::history::router())
        .merge(openapi::router())
        .route_layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(secret))
        .with_state(state.clone());

    let unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /health/liveness: Always 200 while the process is up.
async fn liveness() -> &'static str {
    "ok"
}

/// GET /health/readiness: 200 when the database (if any) answers.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!(error = %e, "readiness check failed: database unreachable");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable");
        }
    }
    (StatusCode::OK, "ready")
}
