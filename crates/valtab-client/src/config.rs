//! Client configuration.
//!
//! [`ClientConfig`] is derived from the pipeline configuration so retrieval
//! timeout, retry count, and user agent have one source of truth.
//! [`NotifyConfig`] is read from the environment once at startup.

use url::Url;
use valtab_update::PipelineConfig;
use zeroize::Zeroizing;

/// Settings for document retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry attempts after the initial request on transport errors.
    pub max_retries: u32,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Take retrieval settings from the pipeline configuration.
    pub fn from_pipeline(config: &PipelineConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            max_retries: config.max_retries,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_pipeline(&PipelineConfig::default())
    }
}

/// Settings for webhook notifications.
///
/// Custom `Debug` implementation redacts the webhook URL, which embeds
/// its own credential.
#[derive(Clone)]
pub struct NotifyConfig {
    /// Slack-compatible incoming webhook URL.
    pub webhook_url: Option<Zeroizing<String>>,
    /// Master switch. When false nothing is posted.
    pub enabled: bool,
    /// Display name posted with each message.
    pub username: String,
    /// Webhook request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field(
                "webhook_url",
                &self.webhook_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("enabled", &self.enabled)
            .field("username", &self.username)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            enabled: true,
            username: "valtab".to_string(),
            timeout_secs: 10,
        }
    }
}

impl NotifyConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `NOTIFY_WEBHOOK_URL` (optional; without it notifications are logged)
    /// - `NOTIFY_ENABLED` (default: `true`; `false`/`0`/`no` disable)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let webhook_url = match lookup("NOTIFY_WEBHOOK_URL").filter(|s| !s.trim().is_empty()) {
            Some(raw) => {
                Url::parse(raw.trim()).map_err(|e| {
                    ConfigError::InvalidUrl("NOTIFY_WEBHOOK_URL".to_string(), e.to_string())
                })?;
                Some(Zeroizing::new(raw.trim().to_string()))
            }
            None => None,
        };
        let enabled = match lookup("NOTIFY_ENABLED") {
            None => true,
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidFlag {
                var: "NOTIFY_ENABLED".to_string(),
                value: raw,
            })?,
        };
        Ok(Self {
            webhook_url,
            enabled,
            ..Self::default()
        })
    }

    /// Whether a webhook should be posted to.
    pub fn webhook_active(&self) -> bool {
        self.enabled && self.webhook_url.is_some()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid boolean for {var}: {value:?}")]
    InvalidFlag { var: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn absent_webhook_means_log_only() {
        let cfg = NotifyConfig::from_lookup(lookup(&[])).unwrap();
        assert!(cfg.enabled);
        assert!(!cfg.webhook_active());
    }

    #[test]
    fn webhook_url_is_validated_and_redacted() {
        let cfg = NotifyConfig::from_lookup(lookup(&[(
            "NOTIFY_WEBHOOK_URL",
            "https://hooks.example.test/services/SECRET",
        )]))
        .unwrap();
        assert!(cfg.webhook_active());
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("[REDACTED]"));

        let bad = NotifyConfig::from_lookup(lookup(&[("NOTIFY_WEBHOOK_URL", "not a url")]));
        assert!(matches!(bad, Err(ConfigError::InvalidUrl(..))));
    }

    #[test]
    fn disabled_flag_turns_webhook_off() {
        let cfg = NotifyConfig::from_lookup(lookup(&[
            ("NOTIFY_WEBHOOK_URL", "https://hooks.example.test/x"),
            ("NOTIFY_ENABLED", "false"),
        ]))
        .unwrap();
        assert!(!cfg.webhook_active());
        assert!(NotifyConfig::from_lookup(lookup(&[("NOTIFY_ENABLED", "maybe")])).is_err());
    }

    #[test]
    fn client_config_follows_pipeline() {
        let pipeline = PipelineConfig {
            request_timeout_secs: 5,
            max_retries: 1,
            ..PipelineConfig::default()
        };
        let cfg = ClientConfig::from_pipeline(&pipeline);
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.max_retries, 1);
        assert!(cfg.user_agent.starts_with("valtab/"));
    }
}
