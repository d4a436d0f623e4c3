#![deny(missing_docs)]

//! # valtab-core — Foundational Types for Statutory Valuation Tables
//!
//! Every other crate in the workspace depends on this one. It has no
//! internal crate dependencies. It uses only `serde`, `serde_json`, `thiserror`,
//! `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Closed category sets.** [`SourceCategory`], [`RecordKind`], and
//!    [`UpdateFrequency`] are enums with exhaustive `match` everywhere.
//!    String labels only appear at the serialization boundary.
//!
//! 2. **Records are lenient, rules are strict.** The three record types
//!    carry optional fields so that extracted batches and manually imported
//!    JSON batches flow through the same validation rule sets. Nothing in
//!    this crate rejects a record; `valtab-validate` does.
//!
//! 3. **[`PeriodKey`] is the only period identity.** A statutory release is
//!    identified by `(year, month)`; ordering uses `year * 100 + month`.
//!
//! 4. **[`CoreError`] hierarchy.** Structured errors with `thiserror`. No
//!    `Box<dyn Error>` and no `.unwrap()` outside tests.

pub mod category;
pub mod error;
pub mod history;
pub mod industry;
pub mod numeric;
pub mod period;
pub mod records;
pub mod source;

// Re-export primary types at crate root for ergonomic imports.
pub use category::{RecordKind, SourceCategory, UpdateFrequency};
pub use error::CoreError;
pub use history::{HistoryStatus, RecordCounts, UpdateHistoryEntry};
pub use industry::{is_known_industry_code, IndustryType, SizeCategory, KNOWN_INDUSTRY_CODES};
pub use numeric::parse_number;
pub use period::PeriodKey;
pub use records::{
    CompanySizeCriterion, ComparableIndustryRecord, DividendReductionBand, RecordBatch,
};
pub use source::DiscoveredSource;
