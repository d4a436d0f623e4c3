//! Batch aggregates reported alongside findings.

use serde::{Deserialize, Serialize};

/// Inclusive range observed in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax<T> {
    /// Smallest observed value.
    pub min: T,
    /// Largest observed value.
    pub max: T,
}

/// Range and mean of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    /// Smallest finite value.
    pub min: f64,
    /// Largest finite value.
    pub max: f64,
    /// Mean of finite values.
    pub average: f64,
}

/// Kind-specific aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindStatistics {
    /// Comparable-industry aggregates.
    #[serde(rename_all = "camelCase")]
    ComparableIndustry {
        /// Number of distinct industry codes.
        distinct_industry_codes: usize,
        /// Average price column.
        average_price: Option<NumericSummary>,
        /// Average dividend column.
        average_dividend: Option<NumericSummary>,
        /// Average profit column.
        average_profit: Option<NumericSummary>,
        /// Average net assets column.
        average_net_assets: Option<NumericSummary>,
    },
    /// Dividend band aggregates.
    #[serde(rename_all = "camelCase")]
    DividendReduction {
        /// Lowest band minimum to highest band maximum.
        capital_span: Option<MinMax<f64>>,
        /// Range of reduction rates.
        reduction_rate_range: Option<MinMax<f64>>,
    },
    /// Company size aggregates.
    #[serde(rename_all = "camelCase")]
    CompanySize {
        /// Distinct industry types, sorted.
        industry_types: Vec<String>,
        /// Distinct size categories, sorted.
        size_categories: Vec<String>,
    },
}

/// Aggregates common to every kind plus the kind-specific block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Number of records in the batch.
    pub record_count: usize,
    /// Observed year range.
    pub year_range: Option<MinMax<i32>>,
    /// Observed month range.
    pub month_range: Option<MinMax<i32>>,
    /// Kind-specific aggregates.
    pub detail: Option<KindStatistics>,
}

/// Range of the present values.
pub fn min_max<T, I>(values: I) -> Option<MinMax<T>>
where
    T: PartialOrd + Copy,
    I: IntoIterator<Item = T>,
{
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some(MinMax { min: v, max: v }),
        Some(MinMax { min, max }) => Some(MinMax {
            min: if v < min { v } else { min },
            max: if v > max { v } else { max },
        }),
    })
}

/// Range of the finite values.
pub fn finite_min_max<I>(values: I) -> Option<MinMax<f64>>
where
    I: IntoIterator<Item = Option<f64>>,
{
    min_max(values.into_iter().flatten().filter(|v| v.is_finite()))
}

/// Range and mean of the finite values.
pub fn summarize<I>(values: I) -> Option<NumericSummary>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let finite: Vec<f64> = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    let range = min_max(finite.iter().copied())?;
    Some(NumericSummary {
        min: range.min,
        max: range.max,
        average: finite.iter().sum::<f64>() / finite.len() as f64,
    })
}

/// Common year/month aggregates.
pub fn period_statistics<I>(record_count: usize, periods: I, detail: KindStatistics) -> Statistics
where
    I: IntoIterator<Item = (Option<i32>, Option<i32>)> + Clone,
{
    Statistics {
        record_count,
        year_range: min_max(periods.clone().into_iter().filter_map(|(y, _)| y)),
        month_range: min_max(periods.into_iter().filter_map(|(_, m)| m)),
        detail: Some(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_ignores_missing_and_non_finite() {
        let summary = summarize([Some(1.0), None, Some(f64::NAN), Some(3.0)]).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert_eq!(summary.average, 2.0);
    }

    #[test]
    fn summarize_empty_is_none() {
        assert!(summarize(Vec::<Option<f64>>::new()).is_none());
        assert!(summarize([None, Some(f64::INFINITY)]).is_none());
    }

    #[test]
    fn min_max_over_integers() {
        let range = min_max([2024, 2025, 2023]).unwrap();
        assert_eq!((range.min, range.max), (2023, 2025));
    }
}
