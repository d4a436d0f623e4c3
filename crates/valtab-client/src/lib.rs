//! # valtab-client — Outbound Adapters
//!
//! Live implementations of the update cycle's collaborator ports:
//!
//! - [`NtaClient`]: index and document retrieval over HTTP with timeout,
//!   `User-Agent`, and backoff retry on transport errors.
//! - [`Utf8Passthrough`] / [`PdfToText`]: byte-to-text conversion.
//! - [`WebhookNotifier`] / [`LogNotifier`]: notification delivery.
//!
//! No adapter logs outside retry warnings and the log notifier itself.

pub mod config;
pub mod error;
pub mod fetch;
pub mod notify;
pub(crate) mod retry;
pub mod text;

pub use config::{ClientConfig, ConfigError, NotifyConfig};
pub use error::{ClientError, NotifyError};
pub use fetch::NtaClient;
pub use notify::{notifier_from_config, LogNotifier, WebhookNotifier};
pub use text::{PdfToText, Utf8Passthrough};
