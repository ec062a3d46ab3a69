//! Stochastic financial simulation for data-center investments
//!
//! This crate wraps a deterministic discounted-cash-flow model in a Monte
//! Carlo sampler. It supports:
//! - Year-by-year cash-flow schedules with occupancy ramps, escalation,
//!   straight-line depreciation and loss-floored tax
//! - NPV, IRR (bounded bisection) and interpolated payback
//! - Uniform, normal and triangular uncertainty on eight financial levers
//! - Reproducible runs: trial `i` always draws from the same random stream
//!   for a given seed, sequentially or in parallel
//! - Percentiles, histograms, VaR and expected shortfall, loss
//!   probabilities, convergence history and correlation-based sensitivity
//!
//! # Example
//!
//! ```
//! use dcplan_core::{FinancialParameters, StochasticVariable, simulation};
//!
//! # fn main() -> dcplan_core::Result<()> {
//! let baseline = FinancialParameters::reference();
//! let variables = vec![
//!     StochasticVariable::revenue_multiplier(),
//!     StochasticVariable::capex_overrun(),
//! ];
//! let result = simulation::run(&baseline, &variables, 1_000, 42)?;
//! assert_eq!(result.npv.values.len(), 1_000);
//! println!("P(NPV < 0) = {:.1}%", result.probability_negative_npv * 100.0);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod cashflow;
pub mod error;
pub mod sampler;
pub mod scenario;
pub mod sensitivity;
pub mod simulation;
pub mod statistics;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{FinancialParametersBuilder, MonteCarloConfig, ScenarioConfig};
pub use error::{Result, SimulationError, ValidationError};
pub use model::{
    CashflowYear, DeterministicResult, FinancialParameters, MonteCarloProgress, MonteCarloResult,
    RunStatus, SensitivityEntry, StochasticVariable, TornadoBar, VariableDistribution,
    VariableId, VariableTarget,
};
pub use statistics::{HistogramBin, Percentiles, Stats, Summary};
