//! Simulation results
//!
//! Contains the output types of the deterministic cash-flow model and of a
//! Monte Carlo run. A `MonteCarloResult` is built once at the end of a run
//! and handed to the caller; nothing in the engine holds on to it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ids::VariableId;
use crate::statistics::{HistogramBin, Summary};

/// One row of the year-by-year cash-flow schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashflowYear {
    /// 1-based project year
    pub year: u32,
    pub occupancy: f64,
    pub revenue: f64,
    pub opex: f64,
    pub depreciation: f64,
    /// Revenue less OPEX and depreciation; may be negative
    pub taxable_income: f64,
    pub tax: f64,
    pub free_cash_flow: f64,
    /// Running total including the year-0 capital outlay
    pub cumulative_free_cash_flow: f64,
}

/// Headline metrics of one evaluated scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub npv: f64,
    /// `None` when the cash-flow stream has no rate of return in the search domain
    pub irr: Option<f64>,
    /// `None` when the capital is not recovered within the project life
    pub payback_years: Option<f64>,
}

impl TrialOutcome {
    /// Outcome of a trial whose perturbed parameters the model cannot evaluate
    #[must_use]
    pub fn undefined() -> Self {
        Self {
            npv: f64::NAN,
            irr: None,
            payback_years: None,
        }
    }

    /// Whether the trial falls short of `hurdle`.
    ///
    /// An undefined IRR counts as a miss only when the capital is also never
    /// recovered. A project that pays back without a defined IRR (zero
    /// CAPEX, a return past the top of the search domain) clears the hurdle.
    #[must_use]
    pub fn misses_hurdle(&self, hurdle: f64) -> bool {
        match self.irr {
            Some(irr) => irr < hurdle,
            None => self.payback_years.is_none(),
        }
    }
}

/// Output of a single deterministic cash-flow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeterministicResult {
    pub schedule: Vec<CashflowYear>,
    pub npv: f64,
    pub irr: Option<f64>,
    pub payback_years: Option<f64>,
}

impl DeterministicResult {
    #[must_use]
    pub fn outcome(&self) -> TrialOutcome {
        TrialOutcome {
            npv: self.npv,
            irr: self.irr,
            payback_years: self.payback_years,
        }
    }

    /// Undiscounted sum of free cash flow over the project life
    #[must_use]
    pub fn total_free_cash_flow(&self) -> f64 {
        self.schedule.iter().map(|y| y.free_cash_flow).sum()
    }
}

/// Raw samples, summary and histogram for one output metric.
///
/// Undefined trial values are stored as NaN in `values` so indices line up
/// with trial numbers; they are excluded from `summary` and `histogram`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDistribution {
    pub values: Vec<f64>,
    pub summary: Summary,
    pub histogram: Vec<HistogramBin>,
}

/// Correlation of one stochastic variable with trial NPV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityEntry {
    pub variable_id: VariableId,
    pub name: String,
    /// Pearson coefficient in [-1, 1]; 0 when either side has no variance
    pub correlation: f64,
}

/// One-at-a-time NPV swing for a variable held at its P10 and P90 values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TornadoBar {
    pub variable_id: VariableId,
    pub name: String,
    pub low_value: f64,
    pub high_value: f64,
    pub npv_at_low: f64,
    pub npv_at_high: f64,
}

impl TornadoBar {
    /// Width of the bar
    #[must_use]
    pub fn swing(&self) -> f64 {
        (self.npv_at_high - self.npv_at_low).abs()
    }
}

/// Running mean NPV after `iteration` trials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    pub iteration: usize,
    pub mean_npv: f64,
}

/// Complete results of a Monte Carlo run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub npv: MetricDistribution,
    pub irr: MetricDistribution,
    pub payback_years: MetricDistribution,
    /// 5th percentile of NPV
    pub value_at_risk_5: Option<f64>,
    /// Mean NPV of the trials at or below the 5th percentile
    pub expected_shortfall_5: Option<f64>,
    /// Share of evaluated trials with NPV below zero
    pub probability_negative_npv: f64,
    /// Share of evaluated trials that miss the hurdle; see
    /// [`TrialOutcome::misses_hurdle`]
    pub probability_irr_below_hurdle: f64,
    /// Trials whose realizations left a target's admissible range. They are
    /// not evaluated: every metric is NaN and they are excluded from the
    /// probabilities above.
    #[serde(default)]
    pub out_of_domain_trials: usize,
    pub hurdle_rate: f64,
    /// Ranked by descending absolute correlation
    pub sensitivity: Vec<SensitivityEntry>,
    pub convergence_history: Vec<ConvergencePoint>,
    /// The unperturbed run, kept for charting
    pub baseline: DeterministicResult,
    pub iterations: usize,
    pub seed: u64,
    pub duration: Duration,
}

impl MonteCarloResult {
    /// Mean NPV over trials with a finite NPV
    #[must_use]
    pub fn mean_npv(&self) -> Option<f64> {
        self.npv.summary.stats.as_ref().map(|s| s.mean)
    }

    /// Median NPV over trials with a finite NPV
    #[must_use]
    pub fn median_npv(&self) -> Option<f64> {
        self.npv.summary.stats.as_ref().map(|s| s.median)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(irr: Option<f64>, payback_years: Option<f64>) -> TrialOutcome {
        TrialOutcome {
            npv: 0.0,
            irr,
            payback_years,
        }
    }

    #[test]
    fn test_misses_hurdle() {
        assert!(outcome(Some(0.08), Some(6.0)).misses_hurdle(0.10));
        assert!(!outcome(Some(0.12), Some(4.0)).misses_hurdle(0.10));
        // Never recovered
        assert!(outcome(None, None).misses_hurdle(0.10));
        // Recovered immediately, no sign change in the cash flows
        assert!(!outcome(None, Some(0.0)).misses_hurdle(0.10));
        assert!(TrialOutcome::undefined().misses_hurdle(0.10));
    }
}
