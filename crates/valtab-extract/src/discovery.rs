//! # Source Discovery
//!
//! Scans index-page text for candidate document links per category, resolves
//! them against the base URL, and attaches period metadata. A link seen more
//! than once is reported once, at its first position.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use url::Url;
use valtab_core::{DiscoveredSource, SourceCategory};

use crate::error::{ExtractError, ExtractResult};
use crate::registry::CategoryRegistry;

/// Candidate sources per category, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscoveredSources {
    by_category: BTreeMap<SourceCategory, Vec<DiscoveredSource>>,
}

impl DiscoveredSources {
    /// Candidates for `category` (empty when none were found).
    pub fn get(&self, category: SourceCategory) -> &[DiscoveredSource] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of candidates across categories.
    pub fn total(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }

    /// Iterate `(category, candidates)` in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceCategory, &[DiscoveredSource])> {
        SourceCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    /// Fail with [`ExtractError::MandatorySourceNotFound`] for the first
    /// required category that has no candidates.
    pub fn require(&self, required: &[SourceCategory]) -> ExtractResult<()> {
        match required.iter().find(|c| self.get(**c).is_empty()) {
            Some(category) => Err(ExtractError::MandatorySourceNotFound {
                category: *category,
            }),
            None => Ok(()),
        }
    }
}

/// Parse a configured base URL.
pub fn parse_base_url(raw: &str) -> ExtractResult<Url> {
    Url::parse(raw).map_err(|source| ExtractError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })
}

/// Discover candidate sources in `index_text`.
///
/// Links are resolved against `base_url`. When a source carries no derivable
/// metadata it is still listed; callers filter with
/// [`DiscoveredSource::is_usable`].
pub fn discover(
    registry: &CategoryRegistry,
    index_text: &str,
    base_url: &Url,
    required: &[SourceCategory],
) -> ExtractResult<DiscoveredSources> {
    let mut by_category = BTreeMap::new();
    for entry in registry.entries() {
        let category = entry.category();
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for link in entry.link_shape().find_iter(index_text) {
            let Ok(resolved) = base_url.join(link.as_str()) else {
                continue;
            };
            let resolved = resolved.to_string();
            if !seen.insert(resolved.clone()) {
                continue;
            }
            let source = registry
                .derive_metadata(category, &resolved)
                .unwrap_or_else(|| DiscoveredSource::bare(resolved, category));
            found.push(source);
        }
        by_category.insert(category, found);
    }
    let sources = DiscoveredSources { by_category };
    sources.require(required)?;
    Ok(sources)
}
