//! Company size criteria line parser.
//!
//! Line shape: `INDUSTRY_TYPE SIZE EMP_MIN EMP_MAX ASSET_MIN ASSET_MAX
//! SALES_MIN SALES_MAX`. Asset and sales thresholds are published in units of
//! 10,000. Japanese labels are normalized to canonical keys; an unrecognized
//! label is kept verbatim for the validator to report.

use regex::{Captures, Regex};
use valtab_core::{parse_number, CompanySizeCriterion, IndustryType, SizeCategory};

use crate::dividend::MAN_UNIT;

/// Line shape for one size criterion row.
pub const LINE_SHAPE: &str = concat!(
    r"(?m)^[ \t\x{3000}]*([^\s\d][^\s]*)[ \t\x{3000}]+",
    r"([^\s\d][^\s]*)[ \t\x{3000}]+(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}]+",
    r"(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}]+",
    r"(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}]+",
    r"(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}]+",
    r"(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}]+",
    r"(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}\r]*$",
);

/// Canonical industry type key for a published label.
pub fn normalize_industry_type(label: &str) -> String {
    IndustryType::parse(label)
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| label.to_string())
}

/// Canonical size key for a published label.
pub fn normalize_size_category(label: &str) -> String {
    SizeCategory::parse(label)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| label.to_string())
}

/// Build one criterion from a line-shape match.
pub fn build(caps: &Captures<'_>, year: i32, month: i32) -> Option<CompanySizeCriterion> {
    let number = |i: usize| caps.get(i).and_then(|m| parse_number(m.as_str()));
    Some(CompanySizeCriterion {
        year: Some(year),
        month: Some(month),
        industry_type: Some(normalize_industry_type(caps.get(1)?.as_str())),
        size_category: Some(normalize_size_category(caps.get(2)?.as_str())),
        employee_min: Some(number(3)?),
        employee_max: Some(number(4)?),
        asset_min: Some(number(5)? * MAN_UNIT),
        asset_max: Some(number(6)? * MAN_UNIT),
        sales_min: Some(number(7)? * MAN_UNIT),
        sales_max: Some(number(8)? * MAN_UNIT),
    })
}

/// Every criterion row in `text`, stamped with the given period.
pub fn extract(line_shape: &Regex, text: &str, year: i32, month: i32) -> Vec<CompanySizeCriterion> {
    line_shape
        .captures_iter(text)
        .filter_map(|caps| build(&caps, year, month))
        .collect()
}
