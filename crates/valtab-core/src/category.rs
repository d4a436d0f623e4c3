//! # Source Categories, Record Kinds, Update Frequencies
//!
//! The tax authority publishes three families of documents. Each family
//! ([`SourceCategory`]) carries exactly one kind of table ([`RecordKind`])
//! and is republished on its own cadence ([`UpdateFrequency`]).
//!
//! | Category    | Record kind           | Frequency | Priority |
//! |-------------|-----------------------|-----------|----------|
//! | `annual`    | `comparable_industry` | yearly    | 1        |
//! | `bimonthly` | `dividend_reduction`  | bimonthly | 2        |
//! | `amendment` | `company_size`        | irregular | 3        |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// SourceCategory
// ---------------------------------------------------------------------------

/// Family of published documents a source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    /// Yearly statutory release.
    Annual,
    /// Release covering a two-month sub-period.
    Bimonthly,
    /// Irregular amendment notice.
    Amendment,
}

impl SourceCategory {
    /// All categories in priority order.
    pub const ALL: [SourceCategory; 3] = [Self::Annual, Self::Bimonthly, Self::Amendment];

    /// Return the string representation of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Bimonthly => "bimonthly",
            Self::Amendment => "amendment",
        }
    }

    /// Reporting rank (annual=1, bimonthly=2, amendment=3). Used for
    /// ordering output only, never for gating an update.
    pub fn priority_rank(&self) -> u8 {
        match self {
            Self::Annual => 1,
            Self::Bimonthly => 2,
            Self::Amendment => 3,
        }
    }

    /// The kind of table documents of this category carry.
    pub fn record_kind(&self) -> RecordKind {
        match self {
            Self::Annual => RecordKind::ComparableIndustry,
            Self::Bimonthly => RecordKind::DividendReduction,
            Self::Amendment => RecordKind::CompanySize,
        }
    }

    /// The republication cadence of this category.
    pub fn frequency(&self) -> UpdateFrequency {
        match self {
            Self::Annual => UpdateFrequency::Yearly,
            Self::Bimonthly => UpdateFrequency::Bimonthly,
            Self::Amendment => UpdateFrequency::Irregular,
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" => Ok(Self::Annual),
            "bimonthly" => Ok(Self::Bimonthly),
            "amendment" => Ok(Self::Amendment),
            _ => Err(CoreError::UnknownCategory(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordKind
// ---------------------------------------------------------------------------

/// Kind of record a batch holds. Also the "data type" recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Comparable-industry valuation multiples.
    ComparableIndustry,
    /// Dividend reduction-rate bands keyed by capital range.
    DividendReduction,
    /// Company size classification thresholds.
    CompanySize,
}

impl RecordKind {
    /// All record kinds.
    pub const ALL: [RecordKind; 3] = [
        Self::ComparableIndustry,
        Self::DividendReduction,
        Self::CompanySize,
    ];

    /// Return the string representation of this record kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComparableIndustry => "comparable_industry",
            Self::DividendReduction => "dividend_reduction",
            Self::CompanySize => "company_size",
        }
    }

    /// The source category whose documents carry this kind.
    pub fn category(&self) -> SourceCategory {
        match self {
            Self::ComparableIndustry => SourceCategory::Annual,
            Self::DividendReduction => SourceCategory::Bimonthly,
            Self::CompanySize => SourceCategory::Amendment,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comparable_industry" | "comparable" => Ok(Self::ComparableIndustry),
            "dividend_reduction" | "dividend" => Ok(Self::DividendReduction),
            "company_size" | "size" => Ok(Self::CompanySize),
            _ => Err(CoreError::UnknownRecordKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// UpdateFrequency
// ---------------------------------------------------------------------------

/// Republication cadence that determines the staleness threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateFrequency {
    /// Republished once a year.
    Yearly,
    /// Republished every two months.
    Bimonthly,
    /// Republished without a fixed schedule.
    Irregular,
}

impl UpdateFrequency {
    /// Return the string representation of this frequency.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Bimonthly => "bimonthly",
            Self::Irregular => "irregular",
        }
    }

    /// Resolve a frequency from either a category label or a frequency label.
    ///
    /// Accepts `annual`/`yearly`, `bimonthly`, and `amendment`/`irregular`.
    /// Returns `None` for anything else; callers decide what an unrecognized
    /// label means.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "annual" | "yearly" => Some(Self::Yearly),
            "bimonthly" => Some(Self::Bimonthly),
            "amendment" | "irregular" => Some(Self::Irregular),
            _ => None,
        }
    }
}

impl fmt::Display for UpdateFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
