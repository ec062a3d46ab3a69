//! Summary statistics, percentiles and histograms over trial outcomes
//!
//! Every function here skips non-finite values (undefined IRR, payback never
//! reached) and reports how many were skipped, so an all-undefined metric
//! yields an explicit empty summary instead of a division by zero.

use serde::{Deserialize, Serialize};

/// Percentile levels reported for every metric
pub const STANDARD_PERCENTILES: [f64; 7] = [0.05, 0.10, 0.25, 0.50, 0.75, 0.90, 0.95];

/// Default number of histogram bins
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

impl Percentiles {
    /// Compute the standard percentile set from an ascending slice
    #[must_use]
    pub fn from_sorted(sorted: &[f64]) -> Self {
        let [p5, p10, p25, p50, p75, p90, p95] = STANDARD_PERCENTILES.map(|p| percentile(sorted, p));
        Self {
            p5,
            p10,
            p25,
            p50,
            p75,
            p90,
            p95,
        }
    }

    /// (level, value) pairs in ascending order
    #[must_use]
    pub fn as_pairs(&self) -> [(f64, f64); 7] {
        [
            (0.05, self.p5),
            (0.10, self.p10),
            (0.25, self.p25),
            (0.50, self.p50),
            (0.75, self.p75),
            (0.90, self.p90),
            (0.95, self.p95),
        ]
    }
}

/// Distribution statistics over the defined values of a metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1); zero for a single value
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
}

/// Statistics for one metric together with its exclusion count.
///
/// `stats` is `None` when no finite value remains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of finite values included
    pub count: usize,
    /// Number of NaN or infinite values skipped
    pub excluded: usize,
    pub stats: Option<Stats>,
}

impl Summary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
    /// `count` over the number of finite values
    pub frequency: f64,
}

/// Arithmetic mean of the finite values, accumulated in slice order.
///
/// The Monte Carlo convergence tracker accumulates in the same order, so its
/// final checkpoint matches this value bit for bit.
#[must_use]
pub fn finite_mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Linear interpolation between order statistics.
///
/// `p` is a fraction in [0, 1]; `sorted` must be ascending. Returns NaN for
/// an empty slice.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let (a, b) = (sorted[lo], sorted[hi]);
    if lo == hi {
        return a;
    }
    let weight = rank - lo as f64;
    (a + (b - a) * weight).max(a).min(b)
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    finite.sort_by(f64::total_cmp);
    finite
}

/// Summarize a metric's raw trial values
#[must_use]
pub fn summarize(values: &[f64]) -> Summary {
    let sorted = sorted_finite(values);
    let excluded = values.len() - sorted.len();
    let Some(mean) = finite_mean(values) else {
        return Summary {
            count: 0,
            excluded,
            stats: None,
        };
    };

    let n = sorted.len();
    let std_dev = if n > 1 {
        let sum_sq: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_sq / (n - 1) as f64).sqrt()
    } else {
        0.0
    };
    let percentiles = Percentiles::from_sorted(&sorted);

    Summary {
        count: n,
        excluded,
        stats: Some(Stats {
            mean,
            median: percentiles.p50,
            std_dev,
            min: sorted[0],
            max: sorted[n - 1],
            percentiles,
        }),
    }
}

/// Partition the observed [min, max] range into equal-width bins.
///
/// The last bin is closed on the right so the maximum is counted. When every
/// value is equal a single zero-width bin holds them all.
#[must_use]
pub fn histogram(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    let sorted = sorted_finite(values);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if bin_count == 0 {
        return Vec::new();
    }

    let total = sorted.len() as f64;
    if max <= min {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: sorted.len(),
            frequency: 1.0,
        }];
    }

    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0_usize; bin_count];
    for v in &sorted {
        let idx = (((v - min) / width).floor() as usize).min(bin_count - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let start = min + width * i as f64;
            let end = if i == bin_count - 1 {
                max
            } else {
                min + width * (i + 1) as f64
            };
            HistogramBin {
                start,
                end,
                count,
                frequency: count as f64 / total,
            }
        })
        .collect()
}

/// Share of `values` (all entries, defined or not) satisfying `predicate`
#[must_use]
pub fn probability(values: &[f64], predicate: impl Fn(f64) -> bool) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| predicate(**v)).count() as f64 / values.len() as f64
}

/// Mean of the finite values at or below `threshold`
#[must_use]
pub fn tail_mean(values: &[f64], threshold: f64) -> Option<f64> {
    let tail: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v <= threshold)
        .collect();
    finite_mean(&tail)
}
