//! # Priority Selection
//!
//! Picks one primary source per category from the discovery output. Annual
//! and bimonthly candidates rank by `year * 100 + month`; amendment
//! candidates by their numeric identifier. Ties go to the candidate seen
//! first. Candidates without usable metadata are never selected.

use serde::Serialize;
use valtab_core::{DiscoveredSource, SourceCategory};
use valtab_extract::DiscoveredSources;

/// The selected source for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimarySource {
    /// Reporting rank (annual=1, bimonthly=2, amendment=3).
    pub rank: u8,
    /// The chosen candidate.
    pub source: DiscoveredSource,
}

fn ranking_key(source: &DiscoveredSource) -> Option<i64> {
    match source.category {
        SourceCategory::Annual | SourceCategory::Bimonthly => source.period().map(|p| p.ordinal()),
        SourceCategory::Amendment => source.amendment_id.and_then(|id| i64::try_from(id).ok()),
    }
}

/// The highest-ranked usable candidate, first-seen on ties.
pub fn select_one(candidates: &[DiscoveredSource]) -> Option<&DiscoveredSource> {
    let mut best: Option<(i64, &DiscoveredSource)> = None;
    for candidate in candidates {
        let Some(key) = ranking_key(candidate) else {
            continue;
        };
        if best.map_or(true, |(best_key, _)| key > best_key) {
            best = Some((key, candidate));
        }
    }
    best.map(|(_, source)| source)
}

/// One primary source per category that has a usable candidate, in rank
/// order.
pub fn select_primary(sources: &DiscoveredSources) -> Vec<PrimarySource> {
    sources
        .iter()
        .filter_map(|(category, candidates)| {
            select_one(candidates).map(|source| PrimarySource {
                rank: category.priority_rank(),
                source: source.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(url: &str, category: SourceCategory, year: i32, month: u32) -> DiscoveredSource {
        let mut source = DiscoveredSource::bare(url, category);
        source.year = Some(year);
        source.month = Some(month);
        source
    }

    fn amendment(url: &str, id: u64) -> DiscoveredSource {
        let mut source = DiscoveredSource::bare(url, SourceCategory::Amendment);
        source.amendment_id = Some(id);
        source
    }

    #[test]
    fn latest_period_wins() {
        let candidates = vec![
            dated("a", SourceCategory::Bimonthly, 2025, 2),
            dated("b", SourceCategory::Bimonthly, 2025, 6),
            dated("c", SourceCategory::Bimonthly, 2024, 12),
        ];
        assert_eq!(select_one(&candidates).unwrap().url, "b");
    }

    #[test]
    fn ties_go_to_first_seen() {
        let candidates = vec![
            dated("first", SourceCategory::Annual, 2025, 6),
            dated("second", SourceCategory::Annual, 2025, 6),
        ];
        assert_eq!(select_one(&candidates).unwrap().url, "first");
    }

    #[test]
    fn amendment_uses_identifier() {
        let candidates = vec![amendment("x", 12), amendment("y", 250), amendment("z", 31)];
        assert_eq!(select_one(&candidates).unwrap().url, "y");
    }

    #[test]
    fn unusable_candidates_are_skipped() {
        let candidates = vec![
            DiscoveredSource::bare("bare", SourceCategory::Annual),
            dated("dated", SourceCategory::Annual, 2020, 1),
        ];
        assert_eq!(select_one(&candidates).unwrap().url, "dated");
        assert!(select_one(&[DiscoveredSource::bare("bare", SourceCategory::Annual)]).is_none());
    }
}
