//! # Error Taxonomy
//!
//! [`CycleError`] is fatal to a run and aborts before any document is
//! retrieved. [`SourceError`] is fatal to one source only; the cycle records
//! it in that source's outcome and continues with the next source.
//! Validation findings are never errors at this level unless the configured
//! policy blocks on them.

use thiserror::Error;
use valtab_core::RecordKind;
use valtab_extract::ExtractError;

use crate::ports::PortError;

/// Errors that abort a whole cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The index page could not be retrieved.
    #[error("index retrieval failed: {0}")]
    IndexRetrieval(#[source] PortError),

    /// Discovery failed, e.g. a mandatory category had no link.
    #[error("discovery failed: {0}")]
    Discovery(#[from] ExtractError),
}

/// Errors that abort processing of one source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The snapshot lookup failed, so no decision could be made.
    #[error("snapshot lookup failed: {0}")]
    SnapshotLookup(#[source] PortError),

    /// Another cycle holds the data type.
    #[error("{0} update already in progress")]
    Busy(RecordKind),

    /// The document could not be retrieved.
    #[error("download failed: {0}")]
    Download(#[source] PortError),

    /// The document could not be converted to text.
    #[error("extraction failed: {0}")]
    Extraction(#[source] PortError),

    /// The text contained no line of the expected shape.
    #[error("extraction produced no {0} records")]
    NoRecords(RecordKind),

    /// The policy blocks persistence when validation reports errors.
    #[error("validation reported {errors} error(s); persistence blocked by policy")]
    ValidationBlocked {
        /// Number of validation errors.
        errors: usize,
    },

    /// Every extracted record failed validation.
    #[error("no valid records remain after dropping {invalid} invalid record(s)")]
    NothingValid {
        /// Number of invalid records dropped.
        invalid: usize,
    },

    /// The store rejected the batch.
    #[error("persistence failed: {0}")]
    Persistence(#[source] PortError),
}
