//! # Period Metadata Deriver
//!
//! Turns a document URL into category-specific period identifiers using the
//! capture groups of that category's link shape:
//!
//! | Category    | URL tokens                     | Derived fields                     |
//! |-------------|--------------------------------|------------------------------------|
//! | `annual`    | `r(\d{2})/(\d{4})/`            | `year = era_base + era`, `month`   |
//! | `bimonthly` | `(\d{6})/(\d{2})_?(\d{2}).pdf` | `year`, `month`, sub-period bounds |
//! | `amendment` | `kaisei/(\d+).pdf`             | `amendment_id`                     |
//!
//! A URL that does not match yields `None`. Callers treat such a source as
//! unusable; it never fails a run.

use regex::Regex;
use valtab_core::{DiscoveredSource, SourceCategory};

/// Link shape for annual comparable-industry documents.
pub const ANNUAL_LINK: &str = r#"[^\s"'<>()=]*/hyoka/r(\d{2})/(\d{4})/[^\s"'<>()]*?\.pdf"#;

/// Link shape for bimonthly dividend reduction documents.
pub const BIMONTHLY_LINK: &str = r#"[^\s"'<>()=]*/hyoka/(\d{6})/(\d{2})_?(\d{2})\.pdf"#;

/// Link shape for amendment notices.
pub const AMENDMENT_LINK: &str = r#"[^\s"'<>()=]*/kaisei/(\d+)\.pdf"#;

/// Default base added to the two-digit era token of annual URLs.
pub const DEFAULT_ERA_BASE_YEAR: i32 = 2000;

/// Derive period metadata for `url` using `link_shape`'s capture groups.
///
/// The returned source keeps `url` verbatim.
pub fn derive(
    category: SourceCategory,
    link_shape: &Regex,
    url: &str,
    era_base_year: i32,
) -> Option<DiscoveredSource> {
    let caps = link_shape.captures(url)?;
    let mut source = DiscoveredSource::bare(url, category);
    match category {
        SourceCategory::Annual => {
            let era: i32 = caps.get(1)?.as_str().parse().ok()?;
            let year_month = caps.get(2)?.as_str();
            source.year = Some(era_base_year + era);
            source.month = Some(year_month.get(..2)?.parse().ok()?);
        }
        SourceCategory::Bimonthly => {
            let year_month = caps.get(1)?.as_str();
            source.year = Some(year_month.get(..4)?.parse().ok()?);
            source.month = Some(year_month.get(4..6)?.parse().ok()?);
            source.sub_period_start = Some(caps.get(2)?.as_str().parse().ok()?);
            source.sub_period_end = Some(caps.get(3)?.as_str().parse().ok()?);
        }
        SourceCategory::Amendment => {
            source.amendment_id = Some(caps.get(1)?.as_str().parse().ok()?);
        }
    }
    Some(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn annual_uses_era_base_and_leading_month_digits() {
        let url = "https://www.nta.go.jp/law/tsutatsu/kobetsu/hyoka/r07/0601/pdf/01.pdf";
        let src = derive(SourceCategory::Annual, &shape(ANNUAL_LINK), url, DEFAULT_ERA_BASE_YEAR)
            .unwrap();
        assert_eq!(src.year, Some(2007));
        assert_eq!(src.month, Some(6));
        assert_eq!(src.url, url);
    }

    #[test]
    fn annual_era_base_is_configurable() {
        let url = "https://www.nta.go.jp/law/tsutatsu/kobetsu/hyoka/r07/0601/pdf/01.pdf";
        let src = derive(SourceCategory::Annual, &shape(ANNUAL_LINK), url, 2018).unwrap();
        assert_eq!(src.year, Some(2025));
    }

    #[test]
    fn bimonthly_reads_year_month_and_sub_periods() {
        let url = "https://www.nta.go.jp/law/tsutatsu/kobetsu/hyoka/202504/0405.pdf";
        let src = derive(SourceCategory::Bimonthly, &shape(BIMONTHLY_LINK), url, 2000).unwrap();
        assert_eq!(src.year, Some(2025));
        assert_eq!(src.month, Some(4));
        assert_eq!(src.sub_period_start, Some(4));
        assert_eq!(src.sub_period_end, Some(5));
    }

    #[test]
    fn bimonthly_accepts_underscore_separator() {
        let url = "/law/tsutatsu/kobetsu/hyoka/202506/06_07.pdf";
        let src = derive(SourceCategory::Bimonthly, &shape(BIMONTHLY_LINK), url, 2000).unwrap();
        assert_eq!(src.sub_period_start, Some(6));
        assert_eq!(src.sub_period_end, Some(7));
    }

    #[test]
    fn amendment_reads_identifier() {
        let url = "https://www.nta.go.jp/law/tsutatsu/kobetsu/kaisei/250401.pdf";
        let src = derive(SourceCategory::Amendment, &shape(AMENDMENT_LINK), url, 2000).unwrap();
        assert_eq!(src.amendment_id, Some(250401));
        assert_eq!(src.year, None);
    }

    #[test]
    fn non_matching_url_yields_none() {
        let url = "https://www.nta.go.jp/taxes/index.htm";
        assert!(derive(SourceCategory::Annual, &shape(ANNUAL_LINK), url, 2000).is_none());
        assert!(derive(SourceCategory::Bimonthly, &shape(BIMONTHLY_LINK), url, 2000).is_none());
        assert!(derive(SourceCategory::Amendment, &shape(AMENDMENT_LINK), url, 2000).is_none());
    }
}
