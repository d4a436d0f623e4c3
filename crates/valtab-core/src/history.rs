//! # Update History
//!
//! Append-only audit entries. One entry is written for every source the
//! update cycle processes, whether it was persisted, partially persisted,
//! skipped, or failed. Entries are never mutated after creation.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::RecordKind;
use crate::period::PeriodKey;

/// Outcome recorded for one processed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    /// Every extracted record was persisted.
    Completed,
    /// A validated subset was persisted; some records were dropped.
    Partial,
    /// Nothing was persisted because of a failure.
    Failed,
    /// No update was needed.
    Skipped,
}

impl HistoryStatus {
    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Parse a stored status label.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "completed" => Some(Self::Completed),
            "partial" => Some(Self::Partial),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row counts for one processed source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCounts {
    /// Records produced by extraction.
    pub extracted: u64,
    /// Records without validation errors.
    pub valid: u64,
    /// Records carrying at least one validation error.
    pub invalid: u64,
    /// Records committed by the persistence collaborator.
    pub persisted: u64,
}

/// One audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHistoryEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// Calendar date of the check.
    pub check_date: NaiveDate,
    /// Record kind the source carries.
    pub data_type: RecordKind,
    /// Release period of the source, when known.
    pub period: Option<PeriodKey>,
    /// Document URL.
    pub source_url: Option<String>,
    /// Hex SHA-256 of the retrieved document.
    pub content_hash: Option<String>,
    /// Notice identifier of an amendment source, e.g. `250401`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amendment_id: Option<u64>,
    /// Row counts.
    pub record_counts: RecordCounts,
    /// Outcome.
    pub status: HistoryStatus,
    /// Free-form note: the decision reason or the failure message.
    pub notes: Option<String>,
    /// When the entry was written.
    pub executed_at: DateTime<Utc>,
}

impl UpdateHistoryEntry {
    /// Start an entry for `data_type` executed at `now`.
    pub fn new(data_type: RecordKind, status: HistoryStatus, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            check_date: now.date_naive(),
            data_type,
            period: None,
            source_url: None,
            content_hash: None,
            amendment_id: None,
            record_counts: RecordCounts::default(),
            status,
            notes: None,
            executed_at: now,
        }
    }

    /// Attach the source period.
    pub fn with_period(mut self, period: Option<PeriodKey>) -> Self {
        self.period = period;
        self
    }

    /// Attach the source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Attach the document content hash.
    pub fn with_content_hash(mut self, hash: Option<String>) -> Self {
        self.content_hash = hash;
        self
    }

    /// Attach the amendment notice identifier.
    pub fn with_amendment_id(mut self, amendment_id: Option<u64>) -> Self {
        self.amendment_id = amendment_id;
        self
    }

    /// Attach row counts.
    pub fn with_counts(mut self, counts: RecordCounts) -> Self {
        self.record_counts = counts;
        self
    }

    /// Attach a note.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
