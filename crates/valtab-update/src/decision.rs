//! # Update Decision Engine
//!
//! Decides whether a primary source should replace stored data. Pure: the
//! caller supplies the snapshot lookup result and the current time.
//!
//! - No stored snapshot for the source's period: update, reason
//!   `"no existing data"`.
//! - Otherwise compare the days elapsed since the first day of the period
//!   against the frequency threshold (yearly 365, bimonthly 60, irregular
//!   30): update when strictly greater.
//! - An unrecognized frequency label always updates.
//!
//! Amendment notices carry an identifier but no release period, so
//! [`decide_amendment`] keys them by identifier against the last loaded
//! notice instead (see [`LoadedAmendment`]).
//!
//! Every decision carries a reason string that includes the elapsed days.

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use valtab_core::{DiscoveredSource, PeriodKey, UpdateFrequency};

use crate::config::StalenessThresholds;

/// Reason recorded when no snapshot exists.
pub const NO_EXISTING_DATA: &str = "no existing data";

/// Stored data found for a `(category, year, month)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingSnapshot {
    /// Period of the stored rows.
    pub period: PeriodKey,
    /// Number of stored rows.
    pub record_count: u64,
}

/// The most recently persisted amendment notice of a record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedAmendment {
    /// Notice identifier, e.g. `250401`.
    pub amendment_id: u64,
    /// Period the notice's rows were stored under.
    pub period: PeriodKey,
    /// When the notice was persisted.
    pub loaded_at: DateTime<Utc>,
}

/// Outcome of the decision for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDecision {
    /// The source decided on.
    pub source: DiscoveredSource,
    /// Period the decision was keyed by.
    pub period: PeriodKey,
    /// Whether the snapshot lookup found stored data.
    pub existing_snapshot_found: bool,
    /// Whether to retrieve and persist.
    pub needs_update: bool,
    /// Audit reason.
    pub reason: String,
}

/// Decision on a frequency label alone. Returns `(needs_update, reason)`.
///
/// `label` accepts category or frequency vocabulary (`annual`/`yearly`,
/// `bimonthly`, `amendment`/`irregular`).
pub fn evaluate(
    label: &str,
    snapshot_present: bool,
    elapsed_days: i64,
    thresholds: &StalenessThresholds,
) -> (bool, String) {
    if !snapshot_present {
        return (true, NO_EXISTING_DATA.to_string());
    }
    let Some(frequency) = UpdateFrequency::from_label(label) else {
        return (
            true,
            format!(
                "unrecognized update frequency \"{label}\"; \
                 {elapsed_days} days elapsed, updating by default"
            ),
        );
    };
    let threshold = thresholds.for_frequency(frequency);
    if elapsed_days > threshold {
        (
            true,
            format!(
                "{elapsed_days} days elapsed exceeds {frequency} threshold of {threshold} days"
            ),
        )
    } else {
        (
            false,
            format!(
                "{elapsed_days} days elapsed is within {frequency} threshold of {threshold} days"
            ),
        )
    }
}

/// Boolean form of [`evaluate`].
pub fn needs_update(
    label: &str,
    snapshot_present: bool,
    elapsed_days: i64,
    thresholds: &StalenessThresholds,
) -> bool {
    evaluate(label, snapshot_present, elapsed_days, thresholds).0
}

/// Decide for `source` keyed by `period`, given the lookup result and `now`.
pub fn decide(
    source: &DiscoveredSource,
    period: PeriodKey,
    snapshot: Option<&ExistingSnapshot>,
    now: DateTime<Utc>,
    thresholds: &StalenessThresholds,
) -> UpdateDecision {
    let elapsed = period.elapsed_days(now).unwrap_or(0);
    let (needs_update, reason) = evaluate(
        source.category.as_str(),
        snapshot.is_some(),
        elapsed,
        thresholds,
    );
    let reason = if snapshot.is_none() {
        format!("{reason} ({elapsed} days since {period})")
    } else {
        reason
    };
    UpdateDecision {
        source: source.clone(),
        period,
        existing_snapshot_found: snapshot.is_some(),
        needs_update,
        reason,
    }
}

/// Decide for an amendment `source` given the last loaded notice.
///
/// - Nothing loaded, or a newer identifier: update under the month of `now`.
/// - The loaded identifier: irregular staleness counted from the day it was
///   loaded, refreshing under the stored period so rows are overwritten.
/// - An older identifier: skip.
pub fn decide_amendment(
    source: &DiscoveredSource,
    loaded: Option<&LoadedAmendment>,
    now: DateTime<Utc>,
    thresholds: &StalenessThresholds,
) -> UpdateDecision {
    let current = PeriodKey {
        year: now.year(),
        month: now.month(),
    };
    let id = source.amendment_id.unwrap_or_default();
    let Some(loaded) = loaded else {
        let elapsed = current.elapsed_days(now).unwrap_or(0);
        return UpdateDecision {
            source: source.clone(),
            period: current,
            existing_snapshot_found: false,
            needs_update: true,
            reason: format!("{NO_EXISTING_DATA} ({elapsed} days since {current}, amendment {id})"),
        };
    };

    let elapsed = (now.date_naive() - loaded.loaded_at.date_naive()).num_days();
    let (period, needs_update, reason) = match id.cmp(&loaded.amendment_id) {
        Ordering::Greater => (
            current,
            true,
            format!(
                "amendment {id} supersedes amendment {} loaded {elapsed} days ago",
                loaded.amendment_id
            ),
        ),
        Ordering::Less => (
            loaded.period,
            false,
            format!(
                "amendment {id} is older than amendment {} loaded {elapsed} days ago",
                loaded.amendment_id
            ),
        ),
        Ordering::Equal => {
            let (update, reason) =
                evaluate(source.category.as_str(), true, elapsed, thresholds);
            (loaded.period, update, format!("amendment {id} already loaded; {reason}"))
        }
    };
    UpdateDecision {
        source: source.clone(),
        period,
        existing_snapshot_found: true,
        needs_update,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use valtab_core::SourceCategory;

    fn thresholds() -> StalenessThresholds {
        StalenessThresholds::default()
    }

    #[test]
    fn bimonthly_within_threshold_does_not_update() {
        assert!(!needs_update("bimonthly", true, 45, &thresholds()));
        assert!(needs_update("bimonthly", true, 75, &thresholds()));
    }

    #[test]
    fn absent_snapshot_always_updates() {
        for label in ["annual", "bimonthly", "amendment", "quarterly"] {
            let (update, reason) = evaluate(label, false, 0, &thresholds());
            assert!(update);
            assert_eq!(reason, NO_EXISTING_DATA);
        }
    }

    #[test]
    fn thresholds_are_strictly_greater() {
        assert!(!needs_update("annual", true, 365, &thresholds()));
        assert!(needs_update("yearly", true, 366, &thresholds()));
        assert!(!needs_update("irregular", true, 30, &thresholds()));
        assert!(needs_update("amendment", true, 31, &thresholds()));
    }

    #[test]
    fn unknown_label_defaults_to_update() {
        let (update, reason) = evaluate("weekly", true, 3, &thresholds());
        assert!(update);
        assert!(reason.contains("3 days"));
    }

    #[test]
    fn reason_always_includes_elapsed_days() {
        let (_, reason) = evaluate("bimonthly", true, 45, &thresholds());
        assert!(reason.contains("45 days"));
    }

    #[test]
    fn decide_measures_from_first_day_of_period() {
        let mut source = DiscoveredSource::bare("u", SourceCategory::Bimonthly);
        source.year = Some(2025);
        source.month = Some(4);
        let period = source.period().unwrap();
        let snapshot = ExistingSnapshot {
            period,
            record_count: 12,
        };
        let now = Utc.with_ymd_and_hms(2025, 5, 16, 0, 0, 0).unwrap();
        let decision = decide(&source, period, Some(&snapshot), now, &thresholds());
        assert!(!decision.needs_update);
        assert!(decision.existing_snapshot_found);
        assert!(decision.reason.contains("45 days"));

        let later = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        assert!(decide(&source, period, Some(&snapshot), later, &thresholds()).needs_update);
    }

    #[test]
    fn decide_without_snapshot_keeps_reason_prefix() {
        let source = DiscoveredSource::bare("u", SourceCategory::Annual);
        let period = PeriodKey::new(2025, 6).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap();
        let decision = decide(&source, period, None, now, &thresholds());
        assert!(decision.needs_update);
        assert!(decision.reason.starts_with(NO_EXISTING_DATA));
        assert!(decision.reason.contains("10 days"));
    }

    fn amendment(id: u64) -> DiscoveredSource {
        let mut source = DiscoveredSource::bare("u", SourceCategory::Amendment);
        source.amendment_id = Some(id);
        source
    }

    fn loaded(id: u64, period: PeriodKey, day: u32) -> LoadedAmendment {
        LoadedAmendment {
            amendment_id: id,
            period,
            loaded_at: Utc.with_ymd_and_hms(2025, 9, day, 3, 0, 0).unwrap(),
        }
    }

    #[test]
    fn first_amendment_uses_current_month() {
        let now = Utc.with_ymd_and_hms(2025, 9, 3, 3, 0, 0).unwrap();
        let decision = decide_amendment(&amendment(250_401), None, now, &thresholds());
        assert!(decision.needs_update);
        assert!(!decision.existing_snapshot_found);
        assert_eq!(decision.period, PeriodKey::new(2025, 9).unwrap());
        assert!(decision.reason.starts_with(NO_EXISTING_DATA));
        assert!(decision.reason.contains("2 days"));
    }

    #[test]
    fn newer_amendment_in_same_month_updates() {
        let september = PeriodKey::new(2025, 9).unwrap();
        let stored = loaded(250_401, september, 3);
        let now = Utc.with_ymd_and_hms(2025, 9, 30, 3, 0, 0).unwrap();
        let decision = decide_amendment(&amendment(250_915), Some(&stored), now, &thresholds());
        assert!(decision.needs_update);
        assert_eq!(decision.period, september);
        assert!(decision.reason.contains("supersedes amendment 250401"));
        assert!(decision.reason.contains("27 days"));
    }

    #[test]
    fn same_amendment_next_month_keeps_stored_period() {
        let september = PeriodKey::new(2025, 9).unwrap();
        let stored = loaded(250_401, september, 3);
        let october = Utc.with_ymd_and_hms(2025, 10, 2, 3, 0, 0).unwrap();
        let decision = decide_amendment(&amendment(250_401), Some(&stored), october, &thresholds());
        assert!(!decision.needs_update);
        assert_eq!(decision.period, september);
        assert!(decision.reason.contains("29 days"));

        let november = Utc.with_ymd_and_hms(2025, 11, 5, 3, 0, 0).unwrap();
        let decision =
            decide_amendment(&amendment(250_401), Some(&stored), november, &thresholds());
        assert!(decision.needs_update);
        assert_eq!(decision.period, september);
    }

    #[test]
    fn older_amendment_is_skipped() {
        let stored = loaded(250_915, PeriodKey::new(2025, 9).unwrap(), 30);
        let now = Utc.with_ymd_and_hms(2025, 12, 1, 3, 0, 0).unwrap();
        let decision = decide_amendment(&amendment(250_401), Some(&stored), now, &thresholds());
        assert!(!decision.needs_update);
        assert!(decision.reason.contains("older than amendment 250915"));
    }
}
