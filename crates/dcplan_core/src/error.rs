use std::fmt;

use crate::model::VariableId;

/// Errors raised while validating a run configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A financial parameter is outside its admissible range
    InvalidParameter {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// The occupancy ramp has no entries
    EmptyOccupancyRamp,
    /// A stochastic variable carries distribution parameters that cannot be sampled
    InvalidDistributionParameters {
        variable: VariableId,
        distribution: &'static str,
        reason: String,
    },
    /// A stochastic variable can realize values its target does not admit
    DistributionOutsideDomain {
        variable: VariableId,
        target: &'static str,
        domain: &'static str,
    },
    /// Two stochastic variables share the same identifier
    DuplicateVariable(VariableId),
    /// The run was asked for zero trials
    ZeroIterations,
    /// Histograms need at least one bin
    ZeroHistogramBins,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidParameter {
                field,
                value,
                reason,
            } => write!(f, "invalid {field} ({value}): {reason}"),
            ValidationError::EmptyOccupancyRamp => {
                write!(f, "occupancy ramp must contain at least one year")
            }
            ValidationError::InvalidDistributionParameters {
                variable,
                distribution,
                reason,
            } => write!(
                f,
                "invalid {distribution} parameters for variable '{variable}': {reason}"
            ),
            ValidationError::DistributionOutsideDomain {
                variable,
                target,
                domain,
            } => write!(
                f,
                "variable '{variable}' can take values outside the admissible range {domain} of {target}"
            ),
            ValidationError::DuplicateVariable(id) => {
                write!(f, "stochastic variable '{id}' is declared more than once")
            }
            ValidationError::ZeroIterations => write!(f, "iterations must be greater than zero"),
            ValidationError::ZeroHistogramBins => {
                write!(f, "histogram bin count must be greater than zero")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors returned by a Monte Carlo run
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Configuration was rejected before any sampling began
    Validation(ValidationError),
    /// Monte Carlo simulation was cancelled by user request
    Cancelled,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Validation(e) => write!(f, "configuration error: {e}"),
            SimulationError::Cancelled => write!(f, "simulation cancelled"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Validation(e) => Some(e),
            SimulationError::Cancelled => None,
        }
    }
}

impl From<ValidationError> for SimulationError {
    fn from(e: ValidationError) -> Self {
        SimulationError::Validation(e)
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
