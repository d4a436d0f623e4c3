//! # Document Retrieval
//!
//! [`NtaClient`] fetches the publication index and the documents it links
//! to. Each request carries the configured `User-Agent`, is bounded by the
//! configured timeout, and is retried with backoff on transport errors.
//! Non-2xx responses are not retried.

use std::time::Duration;

use async_trait::async_trait;
use valtab_update::{DocumentSource, PortError};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::retry::Backoff;

/// HTTP document source.
#[derive(Debug, Clone)]
pub struct NtaClient {
    http: reqwest::Client,
    backoff: Backoff,
}

impl NtaClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            backoff: Backoff::new(config.max_retries),
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ClientError> {
        let resp = self
            .backoff
            .send(url, || self.http.get(url).send())
            .await
            .map_err(|e| ClientError::Http {
                endpoint: url.to_string(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::ApiError {
                endpoint: url.to_string(),
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }
        Ok(resp)
    }

    /// GET `url` and return the body as text.
    pub async fn get_text(&self, url: &str) -> Result<String, ClientError> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| ClientError::Body {
                endpoint: url.to_string(),
                source: e,
            })
    }

    /// GET `url` and return the raw body.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| ClientError::Body {
                endpoint: url.to_string(),
                source: e,
            })?;
        Ok(bytes.to_vec())
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

#[async_trait]
impl DocumentSource for NtaClient {
    async fn fetch_index(&self, url: &str) -> Result<String, PortError> {
        Ok(self.get_text(url).await?)
    }

    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>, PortError> {
        Ok(self.get_bytes(url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_bodies_are_truncated_on_char_boundary() {
        let body = "あ".repeat(300);
        let cut = truncate(&body, 200);
        assert_eq!(cut.chars().count(), 201);
        assert_eq!(truncate("short", 200), "short");
    }

    #[test]
    fn client_builds_from_default_config() {
        assert!(NtaClient::new(&ClientConfig::default()).is_ok());
    }
}
