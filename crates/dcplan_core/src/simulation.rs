//! Monte Carlo orchestrator
//!
//! Runs the cash-flow model once per trial over perturbed parameters and
//! aggregates the outcomes into distributions, risk metrics, a convergence
//! trace and a sensitivity ranking.
//!
//! Trial `i` always draws from `trial_rng(seed, i)`, so results are identical
//! whether the trials run sequentially or on the rayon pool.

use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::cashflow::{evaluate, run_deterministic};
use crate::config::MonteCarloConfig;
use crate::error::{Result, SimulationError};
use crate::model::{
    ConvergencePoint, DeterministicResult, FinancialParameters, MetricDistribution,
    MonteCarloProgress, MonteCarloResult, RunStatus, StochasticVariable, TrialOutcome,
};
use crate::sampler::{Sampler, trial_rng};
use crate::scenario::perturb;
use crate::sensitivity::rank_by_correlation;
use crate::statistics::{finite_mean, histogram, percentile, probability, summarize, tail_mean};

/// Target number of points in the convergence history
const CONVERGENCE_POINTS: usize = 200;

/// Tail level for value at risk and expected shortfall
const VAR_LEVEL: f64 = 0.05;

/// One trial's draws and outcome; `None` when the perturbed parameters fail
/// validation
#[derive(Debug, Clone)]
struct TrialRecord {
    draws: Vec<f64>,
    outcome: Option<TrialOutcome>,
}

/// Run a Monte Carlo simulation with default settings apart from the
/// iteration count and seed
pub fn run(
    baseline: &FinancialParameters,
    variables: &[StochasticVariable],
    iterations: usize,
    seed: u64,
) -> Result<MonteCarloResult> {
    let config = MonteCarloConfig {
        iterations,
        seed,
        ..MonteCarloConfig::default()
    };
    run_with_config(baseline, variables, &config)
}

/// Run a Monte Carlo simulation
pub fn run_with_config(
    baseline: &FinancialParameters,
    variables: &[StochasticVariable],
    config: &MonteCarloConfig,
) -> Result<MonteCarloResult> {
    run_with_progress(baseline, variables, config, &MonteCarloProgress::new())
}

/// Run a Monte Carlo simulation, reporting progress through `progress`.
///
/// Cancellation is checked between trials. A cancelled run returns
/// [`SimulationError::Cancelled`] and discards the partial trials.
pub fn run_with_progress(
    baseline: &FinancialParameters,
    variables: &[StochasticVariable],
    config: &MonteCarloConfig,
    progress: &MonteCarloProgress,
) -> Result<MonteCarloResult> {
    let sampler = match prepare(baseline, variables, config) {
        Ok(sampler) => sampler,
        Err(e) => {
            tracing::warn!(error = %e, "rejected Monte Carlo configuration");
            progress.set_status(RunStatus::Failed);
            return Err(e);
        }
    };

    let start = Instant::now();
    progress.begin(config.iterations);
    tracing::info!(
        iterations = config.iterations,
        seed = config.seed,
        variables = sampler.len(),
        parallel = config.parallel,
        "starting Monte Carlo run"
    );

    let Some(records) = run_trials(baseline, &sampler, config, progress) else {
        tracing::info!(completed = progress.completed(), "Monte Carlo run cancelled");
        progress.set_status(RunStatus::Cancelled);
        return Err(SimulationError::Cancelled);
    };

    let baseline_result = run_deterministic(baseline);
    let result = aggregate(&sampler, records, baseline_result, config, start);

    tracing::info!(
        duration_ms = result.duration.as_millis() as u64,
        mean_npv = result.mean_npv(),
        p_negative_npv = result.probability_negative_npv,
        "Monte Carlo run complete"
    );
    progress.set_status(RunStatus::Complete);
    Ok(result)
}

fn prepare(
    baseline: &FinancialParameters,
    variables: &[StochasticVariable],
    config: &MonteCarloConfig,
) -> Result<Sampler> {
    config.validate()?;
    baseline.validate()?;
    Ok(Sampler::new(variables)?)
}

fn run_trial(
    baseline: &FinancialParameters,
    sampler: &Sampler,
    seed: u64,
    trial: usize,
) -> TrialRecord {
    let mut rng = trial_rng(seed, trial);
    let sampled = sampler.sample(&mut rng);
    let params = perturb(baseline, &sampled);
    let outcome = params.validate().is_ok().then(|| evaluate(&params));
    TrialRecord {
        draws: sampled.values().collect(),
        outcome,
    }
}

/// Execute every trial in index order, or `None` if cancelled
fn run_trials(
    baseline: &FinancialParameters,
    sampler: &Sampler,
    config: &MonteCarloConfig,
    progress: &MonteCarloProgress,
) -> Option<Vec<TrialRecord>> {
    let trial = |i: usize| {
        if progress.is_cancelled() {
            return None;
        }
        let record = run_trial(baseline, sampler, config.seed, i);
        progress.increment();
        Some(record)
    };

    #[cfg(feature = "parallel")]
    let records: Option<Vec<TrialRecord>> = if config.parallel {
        (0..config.iterations).into_par_iter().map(trial).collect()
    } else {
        (0..config.iterations).map(trial).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let records: Option<Vec<TrialRecord>> = (0..config.iterations).map(trial).collect();

    // A cancel that lands after the last trial still wins
    if progress.is_cancelled() {
        return None;
    }
    records
}

fn metric(values: Vec<f64>, bins: usize) -> MetricDistribution {
    MetricDistribution {
        summary: summarize(&values),
        histogram: histogram(&values, bins),
        values,
    }
}

/// Running mean of finite NPVs at a fixed stride, always ending on the last
/// trial. Accumulates in trial order so the final point equals the summary
/// mean exactly.
fn convergence_history(npv: &[f64]) -> Vec<ConvergencePoint> {
    let stride = (npv.len() / CONVERGENCE_POINTS).max(1);
    let mut history = Vec::with_capacity(npv.len() / stride + 1);
    let (mut sum, mut count) = (0.0_f64, 0_usize);

    for (i, v) in npv.iter().enumerate() {
        if v.is_finite() {
            sum += v;
            count += 1;
        }
        let iteration = i + 1;
        if (iteration % stride == 0 || iteration == npv.len()) && count > 0 {
            history.push(ConvergencePoint {
                iteration,
                mean_npv: sum / count as f64,
            });
        }
    }
    history
}

/// Fraction of `items` matching `predicate`; 0 for an empty slice
fn share<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    items.iter().filter(|item| predicate(*item)).count() as f64 / items.len() as f64
}

fn aggregate(
    sampler: &Sampler,
    records: Vec<TrialRecord>,
    baseline: DeterministicResult,
    config: &MonteCarloConfig,
    start: Instant,
) -> MonteCarloResult {
    let n = records.len();
    let mut npv = Vec::with_capacity(n);
    let mut irr = Vec::with_capacity(n);
    let mut payback = Vec::with_capacity(n);
    let mut draws = Vec::with_capacity(n);
    let mut evaluated = Vec::with_capacity(n);

    for record in records {
        let outcome = record.outcome.unwrap_or_else(TrialOutcome::undefined);
        npv.push(outcome.npv);
        irr.push(outcome.irr.unwrap_or(f64::NAN));
        payback.push(outcome.payback_years.unwrap_or(f64::NAN));
        draws.push(record.draws);
        evaluated.extend(record.outcome);
    }

    let out_of_domain_trials = n - evaluated.len();
    if out_of_domain_trials > 0 {
        tracing::warn!(
            out_of_domain_trials,
            iterations = n,
            "some trials drew values outside the admissible parameter range"
        );
    }

    let sensitivity = rank_by_correlation(sampler.columns(), &draws, &npv);
    let convergence = convergence_history(&npv);
    debug_assert_eq!(
        convergence.last().map(|p| p.mean_npv.to_bits()),
        finite_mean(&npv).map(f64::to_bits)
    );

    let npv_dist = metric(npv, config.histogram_bins);
    let value_at_risk_5 = npv_dist.summary.stats.as_ref().map(|s| s.percentiles.p5);
    let expected_shortfall_5 = value_at_risk_5.and_then(|var| tail_mean(&npv_dist.values, var));

    let evaluated_npv: Vec<f64> = evaluated.iter().map(|o| o.npv).collect();
    let probability_negative_npv = probability(&evaluated_npv, |v| v < 0.0);
    let hurdle = config.hurdle_rate;
    let probability_irr_below_hurdle = share(&evaluated, |o| o.misses_hurdle(hurdle));

    let undefined_irr = evaluated.iter().filter(|o| o.irr.is_none()).count();
    if undefined_irr > 0 {
        tracing::warn!(
            undefined_irr,
            iterations = n,
            "some trials have no IRR in the search domain"
        );
    }
    tracing::debug!(
        undefined_payback = payback.iter().filter(|v| !v.is_finite()).count(),
        "aggregated trial outcomes"
    );

    MonteCarloResult {
        irr: metric(irr, config.histogram_bins),
        payback_years: metric(payback, config.histogram_bins),
        npv: npv_dist,
        value_at_risk_5,
        expected_shortfall_5,
        probability_negative_npv,
        probability_irr_below_hurdle,
        out_of_domain_trials,
        hurdle_rate: hurdle,
        sensitivity,
        convergence_history: convergence,
        baseline,
        iterations: n,
        seed: config.seed,
        duration: start.elapsed(),
    }
}

/// Percentile of an unsorted sample, ignoring non-finite values
#[must_use]
pub fn sample_percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(f64::total_cmp);
    Some(percentile(&finite, p))
}

/// Value at risk at the standard 5% level
#[must_use]
pub fn value_at_risk(npv: &[f64]) -> Option<f64> {
    sample_percentile(npv, VAR_LEVEL)
}
