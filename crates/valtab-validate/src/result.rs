//! # Validation Results
//!
//! [`ValidationResult`] is the output of every rule set. `is_valid` holds
//! exactly when `errors` is empty; warnings never block.
//!
//! Messages are collected through [`Findings`], which keeps them in the order
//! the rule sets emit them (record index, then rule) and tracks which record
//! indices carry at least one error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::stats::Statistics;

/// Outcome of validating one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True exactly when `errors` is empty.
    pub is_valid: bool,
    /// Blocking findings, in emission order.
    pub errors: Vec<String>,
    /// Non-blocking findings, in emission order.
    pub warnings: Vec<String>,
    /// Number of records validated.
    pub record_count: usize,
    /// Batch aggregates.
    pub statistics: Statistics,
    /// Indices of records with at least one error, ascending.
    pub invalid_records: Vec<usize>,
    /// Derived 0-100 quality metric.
    pub quality_score: u8,
}

impl ValidationResult {
    /// Number of records without errors.
    pub fn valid_count(&self) -> usize {
        self.record_count.saturating_sub(self.invalid_records.len())
    }
}

/// Quality score: 100, minus 10 per error and 2 per warning, plus 5 for more
/// than 100 records, minus 10 for fewer than 10, clamped to 0-100.
pub fn quality_score(errors: usize, warnings: usize, record_count: usize) -> u8 {
    let mut score: i64 = 100;
    score -= 10 * errors as i64;
    score -= 2 * warnings as i64;
    if record_count > 100 {
        score += 5;
    }
    if record_count < 10 {
        score -= 10;
    }
    score.clamp(0, 100) as u8
}

/// Ordered accumulator for rule findings.
#[derive(Debug, Default)]
pub struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
    invalid: BTreeSet<usize>,
}

impl Findings {
    /// Record an error against record `index`.
    pub fn error(&mut self, index: usize, message: impl AsRef<str>) {
        self.errors
            .push(format!("record[{index}]: {}", message.as_ref()));
        self.invalid.insert(index);
    }

    /// Record a warning against record `index`.
    pub fn warning(&mut self, index: usize, message: impl AsRef<str>) {
        self.warnings
            .push(format!("record[{index}]: {}", message.as_ref()));
    }

    /// Record a batch-level warning not tied to a single record.
    pub fn batch_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Finish into a result.
    pub fn finish(self, record_count: usize, statistics: Statistics) -> ValidationResult {
        let quality_score = quality_score(self.errors.len(), self.warnings.len(), record_count);
        ValidationResult {
            is_valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            record_count,
            statistics,
            invalid_records: self.invalid.into_iter().collect(),
            quality_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_starts_at_100_for_mid_sized_clean_batch() {
        assert_eq!(quality_score(0, 0, 50), 100);
    }

    #[test]
    fn score_penalizes_errors_and_warnings() {
        assert_eq!(quality_score(2, 3, 50), 74);
    }

    #[test]
    fn score_small_batch_penalty_and_large_batch_bonus() {
        assert_eq!(quality_score(0, 0, 9), 90);
        assert_eq!(quality_score(1, 0, 101), 95);
        assert_eq!(quality_score(0, 0, 101), 100);
    }

    #[test]
    fn score_clamps_at_zero() {
        assert_eq!(quality_score(20, 0, 50), 0);
    }

    #[test]
    fn findings_track_invalid_indices_once() {
        let mut findings = Findings::default();
        findings.error(3, "a");
        findings.error(3, "b");
        findings.warning(1, "c");
        findings.error(0, "d");
        let result = findings.finish(5, Statistics::default());
        assert!(!result.is_valid);
        assert_eq!(result.invalid_records, vec![0, 3]);
        assert_eq!(result.errors[0], "record[3]: a");
        assert_eq!(result.valid_count(), 3);
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = Findings::default().finish(0, Statistics::default());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["recordCount"], 0);
        assert!(json["invalidRecords"].as_array().unwrap().is_empty());
        assert_eq!(json["qualityScore"], 90);
    }
}
