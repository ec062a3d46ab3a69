//! Sensitivity analysis
//!
//! Two views of which inputs drive NPV:
//! - `rank_by_correlation` correlates each enabled variable's Monte Carlo
//!   draws with the trial NPVs (the tornado ranking shown after a run)
//! - `tornado` is the deterministic one-at-a-time swing: each variable at its
//!   P10 and P90 with everything else at baseline

use crate::cashflow::run_deterministic;
use crate::error::ValidationError;
use crate::model::{FinancialParameters, SensitivityEntry, StochasticVariable, TornadoBar};
use crate::sampler::{SampledValues, Sampler, SamplerColumn};
use crate::scenario::perturb;

/// Pearson correlation coefficient.
///
/// Pairs where either side is non-finite are skipped. Returns 0 when fewer
/// than two pairs remain or when either side has zero variance.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();
    if pairs.len() < 2 {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Correlate each sampler column against trial NPV.
///
/// `draws[trial][column]` holds the realizations in sampler column order.
/// The result is sorted by descending absolute correlation; ties keep
/// declaration order.
#[must_use]
pub fn rank_by_correlation(
    columns: &[SamplerColumn],
    draws: &[Vec<f64>],
    npv: &[f64],
) -> Vec<SensitivityEntry> {
    let mut entries: Vec<SensitivityEntry> = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let xs: Vec<f64> = draws.iter().map(|trial| trial[idx]).collect();
            SensitivityEntry {
                variable_id: column.id.clone(),
                name: column.name.clone(),
                correlation: pearson(&xs, npv),
            }
        })
        .collect();

    entries.sort_by(|a, b| b.correlation.abs().total_cmp(&a.correlation.abs()));
    entries
}

/// Deterministic one-at-a-time swing analysis over the enabled variables.
///
/// Bars are sorted by descending swing. A P10 or P90 value outside the
/// target's admissible range leaves that side's NPV as NaN.
pub fn tornado(
    baseline: &FinancialParameters,
    variables: &[StochasticVariable],
) -> Result<Vec<TornadoBar>, ValidationError> {
    baseline.validate()?;
    // Reject the configuration the same way a Monte Carlo run would
    Sampler::new(variables)?;

    // NaN when the P10 or P90 of a normal falls outside the target's range
    let npv_with = |variable: &StochasticVariable, value: f64| {
        let params = perturb(baseline, &SampledValues::single(variable.target, value));
        match params.validate() {
            Ok(()) => run_deterministic(&params).npv,
            Err(_) => f64::NAN,
        }
    };

    let mut bars: Vec<TornadoBar> = variables
        .iter()
        .filter(|v| v.enabled)
        .map(|variable| {
            let (low_value, high_value) = variable.distribution.p10_p90();
            TornadoBar {
                variable_id: variable.id.clone(),
                name: variable.name.clone(),
                low_value,
                high_value,
                npv_at_low: npv_with(variable, low_value),
                npv_at_high: npv_with(variable, high_value),
            }
        })
        .collect();

    // Undefined swings sort last
    let key = |bar: &TornadoBar| {
        let swing = bar.swing();
        if swing.is_nan() { -1.0 } else { swing }
    };
    bars.sort_by(|a, b| key(b).total_cmp(&key(a)));
    Ok(bars)
}
