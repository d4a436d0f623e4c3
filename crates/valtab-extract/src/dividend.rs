//! Dividend reduction band line parser.
//!
//! Line shape: `MIN[万円] (～|~|〜|-) MAX[万円] RATE[%]`. Capital bounds are
//! published in units of 10,000 and converted to base units; the rate is a
//! percentage and converted to a fraction.

use regex::{Captures, Regex};
use valtab_core::{parse_number, DividendReductionBand};

/// Multiplier from ten-thousand-unit tokens to base currency units.
pub const MAN_UNIT: f64 = 10_000.0;

/// Line shape for one capital range band.
pub const LINE_SHAPE: &str = concat!(
    r"(?m)^[ \t\x{3000}]*(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}]*(?:万円)?[ \t\x{3000}]*",
    r"(?:～|~|〜|-|－)[ \t\x{3000}]*",
    r"(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}]*(?:万円)?[ \t\x{3000}]+",
    r"(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}]*[%％]?[ \t\x{3000}\r]*$",
);

/// Build one band from a line-shape match.
pub fn build(caps: &Captures<'_>, year: i32, month: i32) -> Option<DividendReductionBand> {
    Some(DividendReductionBand {
        year: Some(year),
        month: Some(month),
        capital_range_min: Some(parse_number(caps.get(1)?.as_str())? * MAN_UNIT),
        capital_range_max: Some(parse_number(caps.get(2)?.as_str())? * MAN_UNIT),
        reduction_rate: Some(parse_number(caps.get(3)?.as_str())? / 100.0),
    })
}

/// Every band in `text`, stamped with the given period.
pub fn extract(
    line_shape: &Regex,
    text: &str,
    year: i32,
    month: i32,
) -> Vec<DividendReductionBand> {
    line_shape
        .captures_iter(text)
        .filter_map(|caps| build(&caps, year, month))
        .collect()
}
