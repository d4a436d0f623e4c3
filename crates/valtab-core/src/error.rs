//! # Error Hierarchy
//!
//! Errors raised while converting labels and identifiers into the closed
//! domain types of this crate. Every variant carries the offending input so
//! operators can diagnose misconfiguration without guesswork.

use thiserror::Error;

/// Errors from parsing domain labels and period identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Source category label is not one of `annual`, `bimonthly`, `amendment`.
    #[error("unknown source category: \"{0}\" (expected annual, bimonthly, or amendment)")]
    UnknownCategory(String),

    /// Record kind label is not recognized.
    #[error(
        "unknown record kind: \"{0}\" \
         (expected comparable_industry, dividend_reduction, or company_size)"
    )]
    UnknownRecordKind(String),

    /// Size category label is not one of the three canonical tiers.
    #[error("unknown size category: \"{0}\" (expected small, mid, or large)")]
    UnknownSizeCategory(String),

    /// Year/month pair does not name a calendar month.
    #[error("invalid period {year}-{month:02} (month must be 1-12)")]
    InvalidPeriod {
        /// The year component.
        year: i32,
        /// The month component as supplied.
        month: i32,
    },
}
