//! # Trigger Authentication
//!
//! Every authenticated route expects `Authorization: Bearer <CRON_SECRET>`.
//! The presented token is compared with the configured secret in constant
//! time. An unset or empty secret rejects everything. Health probes are
//! mounted outside this middleware.

use std::fmt;

use axum::extract::Request;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// The shared secret, carried to the middleware as a request extension.
#[derive(Clone, Default)]
pub struct SharedSecret(Option<String>);

impl SharedSecret {
    /// Wrap the configured secret. Empty strings count as unset.
    pub fn new(secret: Option<String>) -> Self {
        Self(secret.filter(|s| !s.is_empty()))
    }

    fn matches(&self, presented: &str) -> bool {
        match &self.0 {
            // Slice `ct_eq` is false for unequal lengths without inspecting bytes.
            Some(secret) => presented.as_bytes().ct_eq(secret.as_bytes()).into(),
            None => false,
        }
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.0.is_some() { "[REDACTED]" } else { "<unset>" };
        f.debug_tuple("SharedSecret").field(&shown).finish()
    }
}

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    NotConfigured,
    MissingHeader,
    NotBearer,
    WrongToken,
}

impl Rejection {
    fn message(self) -> &'static str {
        match self {
            Self::NotConfigured => "trigger secret not configured",
            Self::MissingHeader => "missing authorization header",
            Self::NotBearer => "authorization header must use Bearer scheme",
            Self::WrongToken => "invalid bearer token",
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, Rejection> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(Rejection::MissingHeader)?;
    value.strip_prefix("Bearer ").ok_or(Rejection::NotBearer)
}

fn check(secret: Option<&SharedSecret>, headers: &HeaderMap) -> Result<(), Rejection> {
    let secret = secret
        .filter(|s| s.0.is_some())
        .ok_or(Rejection::NotConfigured)?;
    let token = bearer_token(headers)?;
    if secret.matches(token) {
        Ok(())
    } else {
        Err(Rejection::WrongToken)
    }
}

/// Reject the request unless it presents the shared secret.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let verdict = check(request.extensions().get::<SharedSecret>(), request.headers());
    match verdict {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            tracing::warn!(
                path = %request.uri().path(),
                reason = rejection.message(),
                "rejected unauthenticated request"
            );
            AppError::Unauthorized(rejection.message().to_string()).into_response()
        }
    }
}
