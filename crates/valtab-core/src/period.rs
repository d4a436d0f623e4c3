//! # Period Keys
//!
//! A statutory release is identified by its `(year, month)` pair. Ordering
//! between releases is by `year * 100 + month`; staleness is measured from
//! the first calendar day of the release month.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The `(year, month)` identity of a statutory release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    /// Gregorian year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

impl PeriodKey {
    /// Build a period key, rejecting months outside 1-12.
    pub fn new(year: i32, month: i32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidPeriod { year, month });
        }
        Ok(Self {
            year,
            month: month as u32,
        })
    }

    /// Ordering value `year * 100 + month`.
    pub fn ordinal(&self) -> i64 {
        i64::from(self.year) * 100 + i64::from(self.month)
    }

    /// First calendar day of the period.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Whole days elapsed between the first day of the period and `now`.
    ///
    /// Negative when the period lies in the future relative to `now`.
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> Option<i64> {
        let start = self.first_day()?;
        Some((now.date_naive() - start).num_days())
    }
}

impl PartialOrd for PeriodKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PeriodKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_month_out_of_range() {
        assert!(PeriodKey::new(2025, 0).is_err());
        assert!(PeriodKey::new(2025, 13).is_err());
        assert!(PeriodKey::new(2025, 12).is_ok());
    }

    #[test]
    fn ordinal_orders_across_years() {
        let dec = PeriodKey::new(2024, 12).unwrap();
        let jan = PeriodKey::new(2025, 1).unwrap();
        assert_eq!(dec.ordinal(), 202412);
        assert!(jan > dec);
    }

    #[test]
    fn elapsed_days_counts_from_first_of_month() {
        let key = PeriodKey::new(2025, 6).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 7, 16, 9, 30, 0).unwrap();
        assert_eq!(key.elapsed_days(now), Some(45));
    }

    #[test]
    fn elapsed_days_negative_for_future_period() {
        let key = PeriodKey::new(2026, 1).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(key.elapsed_days(now), Some(-1));
    }

    #[test]
    fn display_pads_month() {
        assert_eq!(PeriodKey::new(2025, 4).unwrap().to_string(), "2025-04");
    }
}
