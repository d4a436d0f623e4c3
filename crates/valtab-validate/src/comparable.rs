//! Comparable-industry rule set.

use std::collections::{BTreeSet, HashMap};

use valtab_core::{is_known_industry_code, ComparableIndustryRecord};

use crate::result::{Findings, ValidationResult};
use crate::rules::{check_period, non_empty, require_finite, PLAUSIBLE_YEARS};
use crate::stats::{period_statistics, summarize, KindStatistics};

/// Validate a comparable-industry batch.
pub fn validate(records: &[ComparableIndustryRecord]) -> ValidationResult {
    let mut findings = Findings::default();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    for (i, record) in records.iter().enumerate() {
        check_period(&mut findings, i, record.year, record.month);
        if let Some(year) = record.year {
            if !PLAUSIBLE_YEARS.contains(&year) {
                findings.warning(
                    i,
                    format!(
                        "year {year} is outside {}-{}",
                        PLAUSIBLE_YEARS.start(),
                        PLAUSIBLE_YEARS.end()
                    ),
                );
            }
        }

        let code = non_empty(&record.industry_code);
        match code {
            None => findings.error(i, "industry_code is required"),
            Some(code) if !is_known_industry_code(code) => {
                findings.warning(i, format!("unknown industry_code \"{code}\""))
            }
            Some(_) => {}
        }
        if non_empty(&record.industry_name).is_none() {
            findings.error(i, "industry_name is required");
        }

        let columns = [
            ("average_price", record.average_price),
            ("average_dividend", record.average_dividend),
            ("average_profit", record.average_profit),
            ("average_net_assets", record.average_net_assets),
        ];
        for (field, value) in columns {
            let Some(v) = require_finite(&mut findings, i, field, value) else {
                continue;
            };
            if v < 0.0 {
                findings.warning(i, format!("{field} {v} is negative"));
            } else if field == "average_dividend" && v > 100.0 {
                findings.warning(i, format!("{field} {v} is outside 0-100"));
            }
        }

        if let Some(code) = code {
            match first_seen.get(code) {
                Some(first) => findings.error(
                    i,
                    format!("duplicate industry_code \"{code}\" (first seen at record[{first}])"),
                ),
                None => {
                    first_seen.insert(code, i);
                }
            }
        }
    }

    let codes: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| non_empty(&r.industry_code))
        .collect();
    let detail = KindStatistics::ComparableIndustry {
        distinct_industry_codes: codes.len(),
        average_price: summarize(records.iter().map(|r| r.average_price)),
        average_dividend: summarize(records.iter().map(|r| r.average_dividend)),
        average_profit: summarize(records.iter().map(|r| r.average_profit)),
        average_net_assets: summarize(records.iter().map(|r| r.average_net_assets)),
    };
    let statistics = period_statistics(
        records.len(),
        records.iter().map(|r| (r.year, r.month)),
        detail,
    );
    findings.finish(records.len(), statistics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str) -> ComparableIndustryRecord {
        ComparableIndustryRecord {
            year: Some(2025),
            month: Some(6),
            industry_code: Some(code.to_string()),
            industry_name: Some("製造業".to_string()),
            average_price: Some(1500.0),
            average_dividend: Some(2.5),
            average_profit: Some(8.0),
            average_net_assets: Some(1200.0),
        }
    }

    #[test]
    fn clean_batch_is_valid() {
        let result = validate(&[record("01"), record("02")]);
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
        assert_eq!(result.record_count, 2);
    }

    #[test]
    fn duplicate_code_names_the_key() {
        let result = validate(&[record("01"), record("02"), record("01")]);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("\"01\""));
        assert_eq!(result.invalid_records, vec![2]);
    }

    #[test]
    fn unknown_code_is_only_a_warning() {
        let result = validate(&[record("99")]);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("99"));
    }

    #[test]
    fn missing_fields_are_errors() {
        let result = validate(&[ComparableIndustryRecord::default()]);
        assert!(!result.is_valid);
        let joined = result.errors.join("\n");
        for field in [
            "year",
            "month",
            "industry_code",
            "industry_name",
            "average_price",
            "average_dividend",
            "average_profit",
            "average_net_assets",
        ] {
            assert!(joined.contains(field), "missing error for {field}");
        }
    }

    #[test]
    fn non_numeric_is_error_and_negative_is_warning() {
        let mut bad = record("01");
        bad.average_price = Some(f64::NAN);
        bad.average_profit = Some(-3.0);
        let result = validate(&[bad]);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("average_price must be a finite number"));
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("average_profit"));
    }

    #[test]
    fn dividend_above_100_and_implausible_year_warn() {
        let mut odd = record("01");
        odd.average_dividend = Some(150.0);
        odd.year = Some(1999);
        let result = validate(&[odd]);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn month_out_of_range_is_error() {
        let mut odd = record("01");
        odd.month = Some(13);
        let result = validate(&[odd]);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("month 13"));
    }

    #[test]
    fn statistics_summarize_columns() {
        let mut second = record("02");
        second.average_price = Some(500.0);
        second.year = Some(2024);
        let result = validate(&[record("01"), second]);
        let stats = &result.statistics;
        assert_eq!(stats.year_range.unwrap().min, 2024);
        assert_eq!(stats.year_range.unwrap().max, 2025);
        let Some(KindStatistics::ComparableIndustry {
            distinct_industry_codes,
            average_price,
            ..
        }) = &stats.detail
        else {
            panic!("wrong statistics kind");
        };
        assert_eq!(*distinct_industry_codes, 2);
        assert_eq!(average_price.unwrap().average, 1000.0);
    }
}
