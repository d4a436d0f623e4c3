//! Notification payload handed to the [`Notifier`](crate::ports::Notifier).

use serde::{Deserialize, Serialize};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Every source succeeded or was skipped.
    Success,
    /// Some sources failed.
    Warning,
    /// The run failed, or every processed source failed.
    Error,
}

/// `{type, title, message, details}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// One-line headline.
    pub title: String,
    /// Human-readable summary.
    pub message: String,
    /// Structured detail.
    pub details: serde_json::Value,
}
