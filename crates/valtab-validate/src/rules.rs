//! Checks shared by the three rule sets.

use crate::result::Findings;

/// Years outside this range draw a warning on comparable-industry data.
pub const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 2000..=2030;

/// The trimmed value, when present and non-empty.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Year and month must be present; month must name a calendar month.
pub(crate) fn check_period(
    findings: &mut Findings,
    index: usize,
    year: Option<i32>,
    month: Option<i32>,
) {
    if year.is_none() {
        findings.error(index, "year is required");
    }
    match month {
        None => findings.error(index, "month is required"),
        Some(m) if !(1..=12).contains(&m) => {
            findings.error(index, format!("month {m} is outside 1-12"))
        }
        Some(_) => {}
    }
}

/// Outcome of a numeric field check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    /// Field absent.
    Missing,
    /// Field present but NaN or infinite.
    NotFinite,
    /// A usable value.
    Finite(f64),
}

pub(crate) fn classify(value: Option<f64>) -> Numeric {
    match value {
        None => Numeric::Missing,
        Some(v) if v.is_finite() => Numeric::Finite(v),
        Some(_) => Numeric::NotFinite,
    }
}

/// Report a non-finite value as an error. Returns the value when usable.
pub(crate) fn require_finite(
    findings: &mut Findings,
    index: usize,
    field: &str,
    value: Option<f64>,
) -> Option<f64> {
    match classify(value) {
        Numeric::Missing => {
            findings.error(index, format!("{field} is required"));
            None
        }
        Numeric::NotFinite => {
            findings.error(index, format!("{field} must be a finite number"));
            None
        }
        Numeric::Finite(v) => Some(v),
    }
}
