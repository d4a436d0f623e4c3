//! # Discovered Sources
//!
//! A candidate document link found on the index page, with whatever period
//! metadata could be derived from its URL. Rebuilt on every run and never
//! persisted.

use serde::{Deserialize, Serialize};

use crate::category::SourceCategory;
use crate::period::PeriodKey;

/// A candidate document found during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredSource {
    /// Absolute document URL.
    pub url: String,
    /// Family of the document.
    pub category: SourceCategory,
    /// Release year derived from the URL.
    pub year: Option<i32>,
    /// Release month derived from the URL.
    pub month: Option<u32>,
    /// First two-digit sub-period token (bimonthly releases).
    pub sub_period_start: Option<u32>,
    /// Second two-digit sub-period token (bimonthly releases).
    pub sub_period_end: Option<u32>,
    /// Numeric amendment identifier (amendment notices).
    pub amendment_id: Option<u64>,
}

impl DiscoveredSource {
    /// A source with no derived metadata.
    pub fn bare(url: impl Into<String>, category: SourceCategory) -> Self {
        Self {
            url: url.into(),
            category,
            year: None,
            month: None,
            sub_period_start: None,
            sub_period_end: None,
            amendment_id: None,
        }
    }

    /// The release period, when both year and a valid month were derived.
    pub fn period(&self) -> Option<PeriodKey> {
        let year = self.year?;
        let month = self.month?;
        PeriodKey::new(year, month as i32).ok()
    }

    /// Whether enough metadata was derived to rank and process this source.
    ///
    /// Annual and bimonthly sources need a period; amendment sources need an
    /// identifier.
    pub fn is_usable(&self) -> bool {
        match self.category {
            SourceCategory::Annual | SourceCategory::Bimonthly => self.period().is_some(),
            SourceCategory::Amendment => self.amendment_id.is_some(),
        }
    }
}
