//! Comparable-industry line parser.
//!
//! Line shape: `CODE NAME PRICE DIVIDEND PROFIT NET_ASSETS`, where `CODE` is
//! two or three digits and the four figures may carry thousands separators.

use regex::{Captures, Regex};
use valtab_core::{parse_number, ComparableIndustryRecord};

/// Line shape for one comparable-industry row.
pub const LINE_SHAPE: &str = concat!(
    r"(?m)^[ \t\x{3000}]*(\d{2,3})[ \t\x{3000}]+(\S+)[ \t\x{3000}]+",
    r"(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}]+",
    r"(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}]+",
    r"(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}]+",
    r"(-?\d[\d,，]*(?:\.\d+)?)[ \t\x{3000}\r]*$",
);

/// Build one record from a line-shape match.
pub fn build(caps: &Captures<'_>, year: i32, month: i32) -> Option<ComparableIndustryRecord> {
    Some(ComparableIndustryRecord {
        year: Some(year),
        month: Some(month),
        industry_code: Some(caps.get(1)?.as_str().to_string()),
        industry_name: Some(caps.get(2)?.as_str().to_string()),
        average_price: Some(parse_number(caps.get(3)?.as_str())?),
        average_dividend: Some(parse_number(caps.get(4)?.as_str())?),
        average_profit: Some(parse_number(caps.get(5)?.as_str())?),
        average_net_assets: Some(parse_number(caps.get(6)?.as_str())?),
    })
}

/// Every comparable-industry row in `text`, stamped with the given period.
pub fn extract(
    line_shape: &Regex,
    text: &str,
    year: i32,
    month: i32,
) -> Vec<ComparableIndustryRecord> {
    line_shape
        .captures_iter(text)
        .filter_map(|caps| build(&caps, year, month))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> Regex {
        Regex::new(LINE_SHAPE).unwrap()
    }

    #[test]
    fn single_line_round_trip() {
        let rows = extract(&shape(), "01 製造業 1,500.00 2.50 8.00 1,200.00", 2025, 6);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.industry_code.as_deref(), Some("01"));
        assert_eq!(row.industry_name.as_deref(), Some("製造業"));
        assert_eq!(row.average_price, Some(1500.0));
        assert_eq!(row.average_dividend, Some(2.5));
        assert_eq!(row.average_profit, Some(8.0));
        assert_eq!(row.average_net_assets, Some(1200.0));
        assert_eq!(row.year, Some(2025));
        assert_eq!(row.month, Some(6));
    }

    #[test]
    fn non_matching_lines_are_skipped() {
        let text = "類似業種比準価額計算上の業種目及び業種目別株価等\n\
                    番号 業種目 株価 配当 利益 純資産\n\
                    01 製造業 500 10 80 300\n\
                    (注) 金額の単位は円\n\
                    02 建設業 320 4.5 25 410\n";
        let rows = extract(&shape(), text, 2024, 1);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].industry_code.as_deref(), Some("02"));
        assert_eq!(rows[1].average_dividend, Some(4.5));
    }

    #[test]
    fn context_period_applies_to_every_row() {
        let text = "01 製造業 1 2 3 4\n02 建設業 5 6 7 8\n";
        for row in extract(&shape(), text, 2023, 11) {
            assert_eq!((row.year, row.month), (Some(2023), Some(11)));
        }
    }

    #[test]
    fn duplicate_codes_pass_through() {
        let text = "01 製造業 1 2 3 4\n01 製造業 1 2 3 4\n";
        assert_eq!(extract(&shape(), text, 2025, 6).len(), 2);
    }

    #[test]
    fn tolerates_crlf_and_ideographic_space() {
        let text = "01\u{3000}製造業 100 1 2 3\r\n02 建設業 200 1 2 3\r\n";
        assert_eq!(extract(&shape(), text, 2025, 6).len(), 2);
    }
}
