//! # Notification Delivery
//!
//! - [`WebhookNotifier`] posts to a Slack-compatible incoming webhook. The
//!   body carries `text` and `username` for the chat client and the
//!   notification fields (`type`, `title`, `message`, `details`) alongside.
//! - [`LogNotifier`] writes the notification to `tracing` when no webhook
//!   is configured or notifications are disabled.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use valtab_update::{Notification, NotificationKind, Notifier, PortError};
use zeroize::Zeroizing;

use crate::config::NotifyConfig;
use crate::error::NotifyError;

const ICON_EMOJI: &str = ":chart_with_upwards_trend:";

#[derive(Serialize)]
struct WebhookBody<'a> {
    text: String,
    username: &'a str,
    icon_emoji: &'a str,
    #[serde(flatten)]
    notification: &'a Notification,
}

fn marker(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "✅",
        NotificationKind::Warning => "⚠️",
        NotificationKind::Error => "❌",
    }
}

/// Posts notifications to a webhook.
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: Zeroizing<String>,
    username: String,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &"[REDACTED]")
            .field("username", &self.username)
            .finish()
    }
}

impl WebhookNotifier {
    /// Create a notifier posting to `url`.
    pub fn new(
        url: Zeroizing<String>,
        username: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(NotifyError::Transport)?;
        Ok(Self {
            http,
            url,
            username: username.into(),
        })
    }

    /// Post one notification.
    pub async fn post(&self, notification: &Notification) -> Result<(), NotifyError> {
        let body = WebhookBody {
            text: format!(
                "{} {}\n{}",
                marker(notification.kind),
                notification.title,
                notification.message
            ),
            username: &self.username,
            icon_emoji: ICON_EMOJI,
            notification,
        };
        let resp = self
            .http
            .post(self.url.as_str())
            .json(&body)
            .send()
            .await
            .map_err(NotifyError::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), PortError> {
        Ok(self.post(notification).await?)
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, n: &Notification) -> Result<(), PortError> {
        match n.kind {
            NotificationKind::Error => {
                tracing::error!(title = %n.title, details = %n.details, "{}", n.message)
            }
            NotificationKind::Warning => {
                tracing::warn!(title = %n.title, details = %n.details, "{}", n.message)
            }
            NotificationKind::Success => {
                tracing::info!(title = %n.title, details = %n.details, "{}", n.message)
            }
        }
        Ok(())
    }
}

/// The notifier `config` asks for: a webhook when one is configured and
/// enabled, otherwise the log.
pub fn notifier_from_config(config: &NotifyConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match (&config.webhook_url, config.enabled) {
        (Some(url), true) => Ok(Arc::new(WebhookNotifier::new(
            url.clone(),
            config.username.clone(),
            config.timeout_secs,
        )?)),
        _ => Ok(Arc::new(LogNotifier)),
    }
}
