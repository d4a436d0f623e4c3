//! # Update Trigger
//!
//! `POST /api/cron/update-tax-data` runs one update cycle synchronously and
//! answers with the cycle's per-source outcomes. A fatal cycle error still
//! answers with a JSON envelope, never an empty body.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use valtab_update::report::replay_events;
use valtab_update::SourceOutcome;

use crate::state::AppState;

/// Successful trigger response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CronSuccess {
    /// Always `true`.
    pub success: bool,
    /// Elapsed milliseconds.
    pub duration: u64,
    /// One outcome per primary source, in rank order.
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<SourceOutcome>,
}

/// Failed trigger response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CronFailure {
    /// Always `false`.
    pub success: bool,
    /// Why the cycle aborted.
    pub error: String,
    /// Elapsed milliseconds.
    pub duration: u64,
}

/// Build the trigger router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/cron/update-tax-data", post(update_tax_data))
}

/// POST /api/cron/update-tax-data: Run one update cycle.
#[utoipa::path(
    post,
    path = "/api/cron/update-tax-data",
    responses(
        (status = 200, description = "Cycle completed; per-source outcomes", body = CronSuccess),
        (
            status = 401,
            description = "Missing or invalid trigger secret",
            body = crate::error::ErrorBody
        ),
        (status = 500, description = "Cycle aborted", body = CronFailure),
    ),
    tag = "cron"
)]
pub(crate) async fn update_tax_data(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    tracing::info!("update cycle triggered");
    let result = state.cycle.run(Utc::now()).await;
    let duration = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(report) => {
            replay_events(&report.events);
            tracing::info!(
                duration_ms = duration,
                sources = report.outcomes.len(),
                failed = report.failures().count(),
                updated = report.updated().count(),
                "update cycle finished"
            );
            Json(CronSuccess {
                success: true,
                duration,
                results: report.outcomes,
            })
            .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, duration_ms = duration, "update cycle aborted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CronFailure {
                    success: false,
                    error: err.to_string(),
                    duration,
                }),
            )
                .into_response()
        }
    }
}
