//! # Cycle Report
//!
//! What one update cycle did: a [`SourceOutcome`] per primary source, in
//! rank order, plus the [`CycleEvent`] stream. Binaries replay the events
//! with [`replay_events`]; the cycle itself logs only an undeliverable error
//! notification, which no report carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use valtab_core::{HistoryStatus, PeriodKey, RecordCounts, RecordKind, SourceCategory};

/// Validation figures carried into the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Whether the batch had no errors.
    pub is_valid: bool,
    /// Error messages.
    pub errors: Vec<String>,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Quality score 0-100.
    pub quality_score: u8,
}

/// Outcome for one primary source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutcome {
    /// Reporting rank.
    pub rank: u8,
    /// Source category.
    pub category: SourceCategory,
    /// Data type.
    pub data_type: RecordKind,
    /// Document URL.
    pub url: String,
    /// Period the source was processed under.
    pub period: Option<PeriodKey>,
    /// False when a [`SourceError`](crate::error::SourceError) stopped it.
    pub success: bool,
    /// Status written to history.
    pub status: HistoryStatus,
    /// Decision reason.
    pub reason: Option<String>,
    /// Row counts.
    pub counts: RecordCounts,
    /// Validation figures, when validation ran.
    pub validation: Option<ValidationSummary>,
    /// Hex SHA-256 of the document, when it was retrieved.
    pub content_hash: Option<String>,
    /// Failure message.
    pub error: Option<String>,
}

/// Structured event emitted during a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CycleEvent {
    /// Candidates found on the index page.
    Discovered {
        /// Category.
        category: SourceCategory,
        /// Number of candidates.
        candidates: usize,
    },
    /// An annual source's derived period is more than a year before the
    /// cycle; usually a mis-set `era_base_year`.
    StalePeriod {
        /// Category.
        category: SourceCategory,
        /// Source URL.
        url: String,
        /// Period derived from the URL.
        period: PeriodKey,
    },
    /// Decision for a primary source.
    Decided {
        /// Category.
        category: SourceCategory,
        /// Source URL.
        url: String,
        /// Whether an update runs.
        needs_update: bool,
        /// Decision reason.
        reason: String,
    },
    /// Records extracted and validated.
    Validated {
        /// Category.
        category: SourceCategory,
        /// Records extracted.
        records: usize,
        /// Error count.
        errors: usize,
        /// Warning count.
        warnings: usize,
        /// Quality score.
        quality_score: u8,
    },
    /// Batch persisted.
    Persisted {
        /// Category.
        category: SourceCategory,
        /// Rows written.
        rows: u64,
    },
    /// A source failed.
    SourceFailed {
        /// Category.
        category: SourceCategory,
        /// Failure message.
        error: String,
    },
    /// The history entry could not be appended.
    HistoryFailed {
        /// Category.
        category: SourceCategory,
        /// Failure message.
        error: String,
    },
    /// The notification could not be delivered.
    NotificationFailed {
        /// Failure message.
        error: String,
    },
}

impl CycleEvent {
    /// Whether the event reports a problem.
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            Self::StalePeriod { .. }
                | Self::SourceFailed { .. }
                | Self::HistoryFailed { .. }
                | Self::NotificationFailed { .. }
        )
    }
}

/// Everything one cycle did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    /// When the cycle started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Per-source outcomes in rank order.
    pub outcomes: Vec<SourceOutcome>,
    /// Event stream in emission order.
    pub events: Vec<CycleEvent>,
}

impl CycleReport {
    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// Outcomes that persisted data.
    pub fn updated(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, HistoryStatus::Completed | HistoryStatus::Partial))
    }
}

/// Replay cycle events into `tracing`: problems at `warn`, the rest at `info`.
pub fn replay_events(events: &[CycleEvent]) {
    for event in events {
        match event {
            CycleEvent::Discovered {
                category,
                candidates,
            } => tracing::info!(%category, candidates, "sources discovered"),
            CycleEvent::StalePeriod {
                category,
                url,
                period,
            } => tracing::warn!(
                %category,
                %url,
                %period,
                "derived period is more than a year old; check era_base_year"
            ),
            CycleEvent::Decided {
                category,
                url,
                needs_update,
                reason,
            } => tracing::info!(%category, %url, needs_update, %reason, "update decision"),
            CycleEvent::Validated {
                category,
                records,
                errors,
                warnings,
                quality_score,
            } => tracing::info!(
                %category,
                records,
                errors,
                warnings,
                quality_score,
                "batch validated"
            ),
            CycleEvent::Persisted { category, rows } => {
                tracing::info!(%category, rows, "batch persisted")
            }
            CycleEvent::SourceFailed { category, error } => {
                tracing::warn!(%category, %error, "source failed")
            }
            CycleEvent::HistoryFailed { category, error } => {
                tracing::warn!(%category, %error, "history append failed")
            }
            CycleEvent::NotificationFailed { error } => {
                tracing::warn!(%error, "notification delivery failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tag() {
        let event = CycleEvent::Persisted {
            category: SourceCategory::Bimonthly,
            rows: 7,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "persisted");
        assert_eq!(json["rows"], 7);
        assert!(!event.is_problem());
    }

    #[test]
    fn failures_are_problems() {
        let event = CycleEvent::SourceFailed {
            category: SourceCategory::Annual,
            error: "x".into(),
        };
        assert!(event.is_problem());
    }
}
