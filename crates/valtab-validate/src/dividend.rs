//! Dividend reduction band rule set.
//!
//! Per-band checks run first, in record order. The gap check then runs over
//! all bands with finite bounds, sorted ascending by minimum, and warns for
//! every adjacent pair whose bounds do not meet.

use std::collections::HashMap;

use valtab_core::DividendReductionBand;

use crate::result::{Findings, ValidationResult};
use crate::rules::{check_period, classify, require_finite, Numeric};
use crate::stats::{finite_min_max, min_max, period_statistics, KindStatistics, MinMax};

/// Validate a dividend band batch.
pub fn validate(bands: &[DividendReductionBand]) -> ValidationResult {
    let mut findings = Findings::default();
    let mut first_seen: HashMap<u64, usize> = HashMap::new();

    for (i, band) in bands.iter().enumerate() {
        check_period(&mut findings, i, band.year, band.month);

        let min = require_finite(&mut findings, i, "capital_range_min", band.capital_range_min);
        let max = require_finite(&mut findings, i, "capital_range_max", band.capital_range_max);

        let rate = require_finite(&mut findings, i, "reduction_rate", band.reduction_rate);
        if let Some(rate) = rate {
            if !(0.0..=1.0).contains(&rate) {
                findings.warning(i, format!("reduction_rate {rate} is outside 0-1"));
            }
        }

        if let (Some(min), Some(max)) = (min, max) {
            if min >= max {
                findings.error(
                    i,
                    format!("capital_range_min {min} must be less than capital_range_max {max}"),
                );
            }
        }
        if let Some(min) = min {
            if min < 0.0 {
                findings.error(i, format!("capital_range_min {min} is negative"));
            }
            // -0.0 and 0.0 share a key.
            let key = (min + 0.0).to_bits();
            match first_seen.get(&key) {
                Some(first) => findings.error(
                    i,
                    format!(
                        "duplicate capital_range_min {min} (first seen at record[{first}])"
                    ),
                ),
                None => {
                    first_seen.insert(key, i);
                }
            }
        }
    }

    for gap in gaps(bands) {
        findings.batch_warning(format!(
            "gap detected between record[{}] (capital_range_max {}) \
             and record[{}] (capital_range_min {})",
            gap.previous, gap.previous_max, gap.next, gap.next_min
        ));
    }

    let detail = KindStatistics::DividendReduction {
        capital_span: capital_span(bands),
        reduction_rate_range: finite_min_max(bands.iter().map(|b| b.reduction_rate)),
    };
    let periods = bands.iter().map(|b| (b.year, b.month));
    let statistics = period_statistics(bands.len(), periods, detail);
    findings.finish(bands.len(), statistics)
}

/// An adjacent pair (after sorting by minimum) whose bounds do not meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gap {
    /// Index of the lower band in the input.
    pub previous: usize,
    /// Its maximum.
    pub previous_max: f64,
    /// Index of the following band in the input.
    pub next: usize,
    /// Its minimum.
    pub next_min: f64,
}

/// Adjacent pairs that fail to tile, considering only bands with finite
/// bounds. Equal minimums keep input order.
pub fn gaps(bands: &[DividendReductionBand]) -> Vec<Gap> {
    let mut bounded: Vec<(usize, f64, f64)> = bands
        .iter()
        .enumerate()
        .filter_map(|(i, b)| match (classify(b.capital_range_min), classify(b.capital_range_max)) {
            (Numeric::Finite(min), Numeric::Finite(max)) => Some((i, min, max)),
            _ => None,
        })
        .collect();
    bounded.sort_by(|a, b| a.1.total_cmp(&b.1));
    bounded
        .windows(2)
        .filter(|pair| pair[0].2 != pair[1].1)
        .map(|pair| Gap {
            previous: pair[0].0,
            previous_max: pair[0].2,
            next: pair[1].0,
            next_min: pair[1].1,
        })
        .collect()
}

fn capital_span(bands: &[DividendReductionBand]) -> Option<MinMax<f64>> {
    let low = finite_min_max(bands.iter().map(|b| b.capital_range_min))?;
    let high = finite_min_max(bands.iter().map(|b| b.capital_range_max))?;
    min_max([low.min, high.max])
}
