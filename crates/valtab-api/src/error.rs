//! # API Error Envelope
//!
//! Every non-2xx answer from the authenticated API carries
//! `{"error": {"code", "message", "details"?}}`. Storage failures surface as
//! `INTERNAL_ERROR` with a fixed message; the cause goes to the log only.
//!
//! The cron trigger's own failure envelope (`success: false`) lives in
//! [`crate::routes::cron`]; it is a cycle outcome, not a request error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use valtab_update::PortError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Code, message and optional structured details.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// `BAD_REQUEST`, `UNAUTHORIZED` or `INTERNAL_ERROR`.
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Request-level failures of the API.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed query parameter (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or wrong trigger secret (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Storage or other server-side failure (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(m) | Self::Unauthorized(m) => m.clone(),
            Self::Internal(_) => "internal error while serving the request".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Internal(cause) = &self {
            tracing::error!(%cause, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.public_message(),
                details: None,
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<PortError> for AppError {
    fn from(err: PortError) -> Self {
        Self::Internal(err.to_string())
    }
}
