mod ids;
mod params;
mod progress;
mod results;
mod variables;

pub use ids::VariableId;
pub use params::FinancialParameters;
pub use progress::{MonteCarloProgress, RunStatus};
pub use results::{
    CashflowYear, ConvergencePoint, DeterministicResult, MetricDistribution, MonteCarloResult,
    SensitivityEntry, TornadoBar, TrialOutcome,
};
pub use variables::{StochasticVariable, VariableDistribution, VariableTarget};
