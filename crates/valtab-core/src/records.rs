//! # Record Types
//!
//! The three typed rows extracted from statutory documents, and
//! [`RecordBatch`], the unit handed from extraction to validation to
//! persistence.
//!
//! Every field is optional. Extraction always fills every field, but batches
//! imported from JSON may not, and the validation rule sets are the single
//! place that decides what a missing field means. Numeric fields accept
//! numbers or numeric strings on input; see [`crate::numeric`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::category::RecordKind;
use crate::numeric::lenient_f64;
use crate::period::PeriodKey;

/// Comparable-industry valuation multiples for one sector.
///
/// Unique key: `(year, month, industry_code)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparableIndustryRecord {
    /// Release year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Release month.
    #[serde(default)]
    pub month: Option<i32>,
    /// Sector code, e.g. `"01"`.
    #[serde(default)]
    pub industry_code: Option<String>,
    /// Sector name as published.
    #[serde(default)]
    pub industry_name: Option<String>,
    /// Average share price.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_price: Option<f64>,
    /// Average dividend per share.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_dividend: Option<f64>,
    /// Average profit per share.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_profit: Option<f64>,
    /// Average net assets per share.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_net_assets: Option<f64>,
}

/// One capital range band and its dividend reduction rate.
///
/// `reduction_rate` is a fraction in `[0, 1]`; capital bounds are in base
/// currency units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendReductionBand {
    /// Release year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Release month.
    #[serde(default)]
    pub month: Option<i32>,
    /// Inclusive lower bound of the capital range.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub capital_range_min: Option<f64>,
    /// Exclusive upper bound of the capital range.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub capital_range_max: Option<f64>,
    /// Reduction rate as a fraction.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub reduction_rate: Option<f64>,
}

/// Size thresholds for one `(industry_type, size_category)` pair.
///
/// Unique key: `(year, month, industry_type, size_category)`. Asset and
/// sales thresholds are in base currency units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanySizeCriterion {
    /// Release year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Release month.
    #[serde(default)]
    pub month: Option<i32>,
    /// Canonical industry type key (`wholesale`, `retail_service`, `other`).
    #[serde(default)]
    pub industry_type: Option<String>,
    /// Canonical size key (`small`, `mid`, `large`).
    #[serde(default)]
    pub size_category: Option<String>,
    /// Minimum employee count.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub employee_min: Option<f64>,
    /// Maximum employee count.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub employee_max: Option<f64>,
    /// Minimum total assets.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub asset_min: Option<f64>,
    /// Maximum total assets.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub asset_max: Option<f64>,
    /// Minimum annual sales.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sales_min: Option<f64>,
    /// Maximum annual sales.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sales_max: Option<f64>,
}

fn period_of(year: Option<i32>, month: Option<i32>) -> Option<PeriodKey> {
    PeriodKey::new(year?, month?).ok()
}

impl ComparableIndustryRecord {
    /// Release period, when year and a valid month are present.
    pub fn period(&self) -> Option<PeriodKey> {
        period_of(self.year, self.month)
    }
}

impl DividendReductionBand {
    /// Release period, when year and a valid month are present.
    pub fn period(&self) -> Option<PeriodKey> {
        period_of(self.year, self.month)
    }
}

impl CompanySizeCriterion {
    /// Release period, when year and a valid month are present.
    pub fn period(&self) -> Option<PeriodKey> {
        period_of(self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// RecordBatch
// ---------------------------------------------------------------------------

/// A homogeneous batch of records of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum RecordBatch {
    /// Comparable-industry rows.
    ComparableIndustry(Vec<ComparableIndustryRecord>),
    /// Dividend reduction bands.
    DividendReduction(Vec<DividendReductionBand>),
    /// Company size criteria.
    CompanySize(Vec<CompanySizeCriterion>),
}

impl RecordBatch {
    /// An empty batch of the given kind.
    pub fn empty(kind: RecordKind) -> Self {
        match kind {
            RecordKind::ComparableIndustry => Self::ComparableIndustry(Vec::new()),
            RecordKind::DividendReduction => Self::DividendReduction(Vec::new()),
            RecordKind::CompanySize => Self::CompanySize(Vec::new()),
        }
    }

    /// Parse a JSON array of records of the given kind.
    pub fn from_json(kind: RecordKind, json: &str) -> serde_json::Result<Self> {
        Ok(match kind {
            RecordKind::ComparableIndustry => Self::ComparableIndustry(serde_json::from_str(json)?),
            RecordKind::DividendReduction => Self::DividendReduction(serde_json::from_str(json)?),
            RecordKind::CompanySize => Self::CompanySize(serde_json::from_str(json)?),
        })
    }

    /// Kind of records in this batch.
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::ComparableIndustry(_) => RecordKind::ComparableIndustry,
            Self::DividendReduction(_) => RecordKind::DividendReduction,
            Self::CompanySize(_) => RecordKind::CompanySize,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        match self {
            Self::ComparableIndustry(r) => r.len(),
            Self::DividendReduction(r) => r.len(),
            Self::CompanySize(r) => r.len(),
        }
    }

    /// Whether the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct valid periods present in the batch, ascending.
    pub fn periods(&self) -> Vec<PeriodKey> {
        let set: BTreeSet<PeriodKey> = match self {
            Self::ComparableIndustry(r) => r.iter().filter_map(|x| x.period()).collect(),
            Self::DividendReduction(r) => r.iter().filter_map(|x| x.period()).collect(),
            Self::CompanySize(r) => r.iter().filter_map(|x| x.period()).collect(),
        };
        set.into_iter().collect()
    }

    /// A copy of this batch without the records at the given indices.
    pub fn without_indices(&self, drop: &[usize]) -> Self {
        let drop: BTreeSet<usize> = drop.iter().copied().collect();
        fn keep<T: Clone>(rows: &[T], drop: &BTreeSet<usize>) -> Vec<T> {
            rows.iter()
                .enumerate()
                .filter(|(i, _)| !drop.contains(i))
                .map(|(_, r)| r.clone())
                .collect()
        }
        match self {
            Self::ComparableIndustry(r) => Self::ComparableIndustry(keep(r, &drop)),
            Self::DividendReduction(r) => Self::DividendReduction(keep(r, &drop)),
            Self::CompanySize(r) => Self::CompanySize(keep(r, &drop)),
        }
    }
}
