//! # History and Status Queries
//!
//! Read-only views over the append-only update history and the stored
//! tables.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use valtab_core::{RecordKind, UpdateHistoryEntry};

use crate::error::AppError;
use crate::state::AppState;
use crate::store::StoreStatus;

/// Default number of entries returned by `GET /v1/history`.
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Upper bound on `limit`.
pub const MAX_HISTORY_LIMIT: u32 = 500;

/// Query parameters for `GET /v1/history`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct HistoryParams {
    /// Restrict to one data type (`comparable_industry`, `dividend_reduction`, `company_size`).
    pub data_type: Option<String>,
    /// Maximum entries, newest first.
    pub limit: Option<u32>,
}

/// History response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    /// Entries, newest first.
    #[schema(value_type = Vec<Object>)]
    pub entries: Vec<UpdateHistoryEntry>,
}

/// Status response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Per-data-type summary.
    #[schema(value_type = Object)]
    pub status: StoreStatus,
}

/// Build the query router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/history", get(list_history))
        .route("/v1/status", get(status))
}

/// GET /v1/history: Recent update history.
#[utoipa::path(
    get,
    path = "/v1/history",
    params(HistoryParams),
    responses(
        (status = 200, description = "History entries, newest first", body = HistoryResponse),
        (
            status = 400,
            description = "Unknown data type or bad limit",
            body = crate::error::ErrorBody
        ),
    ),
    tag = "history"
)]
pub(crate) async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, AppError> {
    let data_type = params
        .data_type
        .as_deref()
        .map(str::parse::<RecordKind>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 || limit > MAX_HISTORY_LIMIT {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_HISTORY_LIMIT}"
        )));
    }
    let entries = state.history.recent_history(data_type, limit).await?;
    Ok(Json(HistoryResponse { entries }))
}

/// GET /v1/status: Stored rows and latest update per data type.
#[utoipa::path(
    get,
    path = "/v1/status",
    responses(
        (status = 200, description = "Store status", body = StatusResponse),
    ),
    tag = "history"
)]
pub(crate) async fn status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, AppError> {
    let status = state.history.status().await?;
    Ok(Json(StatusResponse { status }))
}
