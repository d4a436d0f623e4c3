//! Company size rule set.
//!
//! Threshold fields are optional, but when present they must be finite. Each
//! `(min, max)` pair is compared only when both ends are usable; an inverted
//! pair is an error, and no negative-value warning is issued for either end
//! of a pair that already failed.

use std::collections::{BTreeSet, HashMap};

use valtab_core::{CompanySizeCriterion, IndustryType, SizeCategory};

use crate::result::{Findings, ValidationResult};
use crate::rules::{check_period, classify, non_empty, Numeric};
use crate::stats::{period_statistics, KindStatistics};

fn is_canonical_industry_type(value: &str) -> bool {
    IndustryType::ALL.iter().any(|t| t.as_str() == value)
}

fn is_canonical_size_category(value: &str) -> bool {
    SizeCategory::ALL.iter().any(|s| s.as_str() == value)
}

/// Validate a company size batch.
pub fn validate(criteria: &[CompanySizeCriterion]) -> ValidationResult {
    let mut findings = Findings::default();
    let mut first_seen: HashMap<(&str, &str), usize> = HashMap::new();

    for (i, row) in criteria.iter().enumerate() {
        check_period(&mut findings, i, row.year, row.month);

        let industry_type = non_empty(&row.industry_type);
        match industry_type {
            None => findings.error(i, "industry_type is required"),
            Some(t) if !is_canonical_industry_type(t) => {
                findings.warning(i, format!("unknown industry_type \"{t}\""))
            }
            Some(_) => {}
        }
        let size_category = non_empty(&row.size_category);
        match size_category {
            None => findings.error(i, "size_category is required"),
            Some(s) if !is_canonical_size_category(s) => findings.error(
                i,
                format!("size_category \"{s}\" is not one of small, mid, large"),
            ),
            Some(_) => {}
        }

        let pairs = [
            ("employee", row.employee_min, row.employee_max),
            ("asset", row.asset_min, row.asset_max),
            ("sales", row.sales_min, row.sales_max),
        ];
        for (name, min, max) in pairs {
            check_pair(&mut findings, i, name, min, max);
        }

        if let (Some(t), Some(s)) = (industry_type, size_category) {
            match first_seen.get(&(t, s)) {
                Some(first) => findings.error(
                    i,
                    format!(
                        "duplicate (industry_type, size_category) (\"{t}\", \"{s}\") \
                         (first seen at record[{first}])"
                    ),
                ),
                None => {
                    first_seen.insert((t, s), i);
                }
            }
        }
    }

    let industry_types: BTreeSet<String> = criteria
        .iter()
        .filter_map(|r| non_empty(&r.industry_type).map(str::to_string))
        .collect();
    let size_categories: BTreeSet<String> = criteria
        .iter()
        .filter_map(|r| non_empty(&r.size_category).map(str::to_string))
        .collect();
    let detail = KindStatistics::CompanySize {
        industry_types: industry_types.into_iter().collect(),
        size_categories: size_categories.into_iter().collect(),
    };
    let statistics = period_statistics(
        criteria.len(),
        criteria.iter().map(|r| (r.year, r.month)),
        detail,
    );
    findings.finish(criteria.len(), statistics)
}

fn check_pair(
    findings: &mut Findings,
    index: usize,
    name: &str,
    min: Option<f64>,
    max: Option<f64>,
) {
    let min_field = format!("{name}_min");
    let max_field = format!("{name}_max");
    let (min, max) = (classify(min), classify(max));
    for (field, value) in [(&min_field, min), (&max_field, max)] {
        if value == Numeric::NotFinite {
            findings.error(index, format!("{field} must be a finite number"));
        }
    }
    if let (Numeric::Finite(lo), Numeric::Finite(hi)) = (min, max) {
        if lo >= hi {
            findings.error(
                index,
                format!(
                    "{name} range invalid: {min_field} {lo} must be less than {max_field} {hi}"
                ),
            );
            return;
        }
    }
    for (field, value) in [(&min_field, min), (&max_field, max)] {
        if let Numeric::Finite(v) = value {
            if v < 0.0 {
                findings.warning(index, format!("{field} {v} is negative"));
            }
        }
    }
}
