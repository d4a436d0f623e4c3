//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI spec served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Shared trigger secret. Set via CRON_SECRET env var."))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "valtab API",
        version = "0.3.0",
        description = "Scheduled retrieval, extraction, validation, and persistence of \
                       statutory valuation tables.\n\n\
                       Authentication: `Authorization: Bearer <CRON_SECRET>`. \
                       Health probes (`/health/*`) are unauthenticated."
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        crate::routes::cron::update_tax_data,
        crate::routes::history::list_history,
        crate::routes::history::status,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::cron::CronSuccess,
        crate::routes::cron::CronFailure,
        crate::routes::history::HistoryResponse,
        crate::routes::history::StatusResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "cron", description = "Update trigger"),
        (name = "history", description = "Update history and store status"),
    )
)]
pub struct ApiDoc;

/// Router serving the spec.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
