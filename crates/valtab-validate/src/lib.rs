//! # valtab-validate — Business-Rule Validation
//!
//! One rule set per record kind. Each returns a [`ValidationResult`] with
//! ordered errors and warnings, batch [`Statistics`], the indices of invalid
//! records, and a quality score. Validation is pure and deterministic:
//! validating the same batch twice yields identical output.
//!
//! Errors block (`is_valid` is false when any exist); warnings never do.
//! When a rule raises an error for a field, no warning is raised for that
//! same field.

pub mod company_size;
pub mod comparable;
pub mod dividend;
pub mod result;
mod rules;
pub mod stats;

pub use result::{quality_score, Findings, ValidationResult};
pub use rules::PLAUSIBLE_YEARS;
pub use stats::{KindStatistics, MinMax, NumericSummary, Statistics};

use valtab_core::RecordBatch;

/// Validate a batch with the rule set for its kind.
pub fn validate_batch(batch: &RecordBatch) -> ValidationResult {
    match batch {
        RecordBatch::ComparableIndustry(records) => comparable::validate(records),
        RecordBatch::DividendReduction(bands) => dividend::validate(bands),
        RecordBatch::CompanySize(criteria) => company_size::validate(criteria),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valtab_core::RecordKind;

    #[test]
    fn empty_batches_are_valid_with_small_batch_penalty() {
        for kind in RecordKind::ALL {
            let result = validate_batch(&RecordBatch::empty(kind));
            assert!(result.is_valid);
            assert_eq!(result.record_count, 0);
            assert_eq!(result.quality_score, 90);
        }
    }
}
