//! Run configuration
//!
//! `MonteCarloConfig` holds the knobs of a single Monte Carlo run.
//! `ScenarioConfig` bundles a baseline, its stochastic variables and the run
//! settings into one serializable document, which is what the CLI loads from
//! a scenario file.
//!
//! # Builder DSL
//!
//! ```
//! use dcplan_core::config::FinancialParametersBuilder;
//!
//! # fn main() -> Result<(), dcplan_core::ValidationError> {
//! let params = FinancialParametersBuilder::new()
//!     .capex(25_000_000.0)
//!     .capacity_kw(5_000.0)
//!     .revenue_rate(140.0)
//!     .occupancy_ramp([0.4, 0.7, 0.9])
//!     .build()?;
//! assert_eq!(params.occupancy_ramp.len(), 3);
//!
//! // Out-of-range values are rejected at build time
//! assert!(FinancialParametersBuilder::new().tax_rate(1.5).build().is_err());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{FinancialParameters, StochasticVariable};
use crate::statistics::DEFAULT_HISTOGRAM_BINS;

pub mod builder;

pub use builder::FinancialParametersBuilder;

fn default_iterations() -> usize {
    10_000
}

fn default_seed() -> u64 {
    42
}

fn default_hurdle_rate() -> f64 {
    0.10
}

fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}

fn default_true() -> bool {
    true
}

/// Settings for one Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// IRR threshold for the below-hurdle probability
    #[serde(default = "default_hurdle_rate")]
    pub hurdle_rate: f64,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    /// Run trials on the rayon pool when the `parallel` feature is enabled.
    /// Results do not depend on this flag.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            seed: default_seed(),
            hurdle_rate: default_hurdle_rate(),
            histogram_bins: default_histogram_bins(),
            parallel: true,
        }
    }
}

impl MonteCarloConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.iterations == 0 {
            return Err(ValidationError::ZeroIterations);
        }
        if self.histogram_bins == 0 {
            return Err(ValidationError::ZeroHistogramBins);
        }
        if !self.hurdle_rate.is_finite() {
            return Err(ValidationError::InvalidParameter {
                field: "hurdle_rate",
                value: self.hurdle_rate,
                reason: "must be finite",
            });
        }
        Ok(())
    }
}

/// A complete scenario document: baseline, uncertainties and run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub parameters: FinancialParameters,
    #[serde(default)]
    pub variables: Vec<StochasticVariable>,
    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,
}

impl ScenarioConfig {
    /// The reference facility with the standard variable set
    #[must_use]
    pub fn reference() -> Self {
        Self {
            parameters: FinancialParameters::reference(),
            variables: StochasticVariable::standard_set(),
            monte_carlo: MonteCarloConfig::default(),
        }
    }

    /// Validate everything a run would validate, without running it
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.monte_carlo.validate()?;
        self.parameters.validate()?;
        crate::sampler::Sampler::new(&self.variables)?;
        Ok(())
    }
}
