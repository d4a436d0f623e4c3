//! Backoff for document retrieval.
//!
//! Only transport failures (connect errors, timeouts) are retried. An HTTP
//! response of any status ends the loop and is judged by the caller.

use std::future::Future;
use std::time::Duration;

/// Exponential backoff schedule: `base`, `2 * base`, `4 * base`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Backoff {
    retries: u32,
    base: Duration,
}

impl Backoff {
    pub(crate) const DEFAULT_BASE: Duration = Duration::from_millis(500);

    pub(crate) fn new(retries: u32) -> Self {
        Self {
            retries,
            base: Self::DEFAULT_BASE,
        }
    }

    #[cfg(test)]
    fn with_base(mut self, base: Duration) -> Self {
        self.base = base;
        self
    }

    /// Pause before retry number `retry` (zero-based).
    pub(crate) fn delay(&self, retry: u32) -> Duration {
        self.base.saturating_mul(1u32.checked_shl(retry).unwrap_or(u32::MAX))
    }

    /// Run `send` once, then again after each transport failure until the
    /// retries are spent. `url` only labels the log events.
    pub(crate) async fn send<T, F, Fut>(&self, url: &str, send: F) -> Result<T, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, reqwest::Error>>,
    {
        let mut retry = 0;
        loop {
            match send().await {
                Err(e) if retry < self.retries && (e.is_connect() || e.is_timeout()) => {
                    let pause = self.delay(retry);
                    tracing::warn!(
                        url,
                        retry = retry + 1,
                        of = self.retries,
                        ?pause,
                        error = %e,
                        "retrieval failed, backing off"
                    );
                    tokio::time::sleep(pause).await;
                    retry += 1;
                }
                other => return other,
            }
        }
    }
}
