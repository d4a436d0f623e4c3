//! Client error types.

use valtab_update::PortError;

/// Errors from outbound HTTP calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error after retries were exhausted.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The server returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The response body could not be read.
    #[error("failed to read response body from {endpoint}: {source}")]
    Body {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl ClientError {
    /// The URL the failing call targeted, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Http { endpoint, .. }
            | Self::ApiError { endpoint, .. }
            | Self::Body { endpoint, .. } => Some(endpoint),
            Self::Config(_) => None,
        }
    }
}

impl From<ClientError> for PortError {
    fn from(err: ClientError) -> Self {
        PortError::Retrieval {
            url: err.endpoint().unwrap_or_default().to_string(),
            message: err.to_string(),
        }
    }
}

/// Errors from notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Transport failure posting to the webhook.
    #[error("webhook delivery failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The webhook answered with a non-2xx status.
    #[error("webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<NotifyError> for PortError {
    fn from(err: NotifyError) -> Self {
        PortError::Notification(err.to_string())
    }
}
