//! # Collaborator Ports
//!
//! Traits for everything the update cycle does not do itself: retrieval,
//! byte-to-text conversion, snapshot lookup, persistence, and notification
//! delivery. Implementations must be `Send + Sync` so they can be shared
//! behind an `Arc`; the traits are object-safe so the cycle holds
//! `Arc<dyn ...>` and adapters can be swapped (live vs. in-memory).

use async_trait::async_trait;
use valtab_core::{PeriodKey, RecordBatch, RecordKind, UpdateHistoryEntry};

use crate::config::ReplaceScope;
use crate::decision::{ExistingSnapshot, LoadedAmendment};
use crate::notification::Notification;

/// Errors surfaced by collaborator implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// Network retrieval failed or timed out.
    #[error("retrieval of {url} failed: {message}")]
    Retrieval {
        /// Requested URL.
        url: String,
        /// Failure description.
        message: String,
    },

    /// The document bytes could not be converted to text.
    #[error("text extraction failed: {0}")]
    TextExtraction(String),

    /// The store rejected a read or write.
    #[error("storage failed: {0}")]
    Storage(String),

    /// The notification channel rejected a delivery.
    #[error("notification failed: {0}")]
    Notification(String),
}

/// Retrieves the index page and documents.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the index page as text.
    async fn fetch_index(&self, url: &str) -> Result<String, PortError>;

    /// Fetch a document's raw bytes.
    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>, PortError>;
}

/// Converts document bytes to text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Convert `bytes` to text.
    async fn to_text(&self, bytes: &[u8]) -> Result<String, PortError>;
}

/// Reports what is already stored.
#[async_trait]
pub trait SnapshotLookup: Send + Sync {
    /// Stored data of `kind` for `period`, if any.
    async fn find_snapshot(
        &self,
        kind: RecordKind,
        period: PeriodKey,
    ) -> Result<Option<ExistingSnapshot>, PortError>;

    /// The newest amendment notice of `kind` persisted by a completed or
    /// partial update, if any.
    async fn latest_amendment(
        &self,
        kind: RecordKind,
    ) -> Result<Option<LoadedAmendment>, PortError>;
}

/// Persists accepted batches and audit entries.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Atomically replace stored rows with `batch` under `scope`. Returns the
    /// number of rows written. Either every row commits or none do.
    async fn replace(&self, batch: &RecordBatch, scope: ReplaceScope) -> Result<u64, PortError>;

    /// Append one audit entry.
    async fn append_history(&self, entry: &UpdateHistoryEntry) -> Result<(), PortError>;
}

/// Delivers notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `notification`.
    async fn notify(&self, notification: &Notification) -> Result<(), PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_traits_are_object_safe() {
        fn assert_object<T: ?Sized>() {}
        assert_object::<dyn DocumentSource>();
        assert_object::<dyn TextExtractor>();
        assert_object::<dyn SnapshotLookup>();
        assert_object::<dyn RecordSink>();
        assert_object::<dyn Notifier>();
    }

    #[test]
    fn retrieval_error_names_url() {
        let err = PortError::Retrieval {
            url: "https://example.test/x.pdf".into(),
            message: "timed out".into(),
        };
        assert_eq!(
            err.to_string(),
            "retrieval of https://example.test/x.pdf failed: timed out"
        );
    }
}
