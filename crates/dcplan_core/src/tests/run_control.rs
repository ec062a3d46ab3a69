//! Tests for validation failures, progress reporting and cancellation

use crate::config::MonteCarloConfig;
use crate::error::{SimulationError, ValidationError};
use crate::model::{
    FinancialParameters, MonteCarloProgress, RunStatus, StochasticVariable, VariableDistribution,
    VariableTarget,
};
use crate::simulation::{run, run_with_progress};

#[test]
fn test_zero_iterations_rejected() {
    let err = run(&FinancialParameters::reference(), &[], 0, 42).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Validation(ValidationError::ZeroIterations)
    ));
}

#[test]
fn test_invalid_distribution_fails_run() {
    let variables = vec![StochasticVariable::new(
        "bad_normal",
        "Bad normal",
        VariableDistribution::Normal {
            mean: 1.0,
            std_dev: -0.1,
        },
        VariableTarget::OpexMultiplier,
    )];
    let progress = MonteCarloProgress::new();
    let err = run_with_progress(
        &FinancialParameters::reference(),
        &variables,
        &MonteCarloConfig::default(),
        &progress,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        SimulationError::Validation(ValidationError::InvalidDistributionParameters { .. })
    ));
    assert_eq!(progress.status(), RunStatus::Failed);
    assert_eq!(progress.completed(), 0);
}

#[test]
fn test_invalid_baseline_fails_run() {
    let baseline = FinancialParameters {
        occupancy_ramp: vec![],
        ..FinancialParameters::reference()
    };
    let err = run(&baseline, &[], 10, 42).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Validation(ValidationError::EmptyOccupancyRamp)
    ));
}

#[test]
fn test_progress_reaches_total() {
    let progress = MonteCarloProgress::new();
    let config = MonteCarloConfig {
        iterations: 321,
        ..Default::default()
    };
    run_with_progress(
        &FinancialParameters::reference(),
        &StochasticVariable::standard_set(),
        &config,
        &progress,
    )
    .unwrap();

    assert_eq!(progress.completed(), 321);
    assert_eq!(progress.total(), 321);
    assert_eq!(progress.status(), RunStatus::Complete);
    assert!((progress.fraction() - 1.0).abs() < 1e-12);
}

#[test]
fn test_cancelled_run_returns_no_result() {
    let progress = MonteCarloProgress::new();
    progress.cancel();

    let err = run_with_progress(
        &FinancialParameters::reference(),
        &StochasticVariable::standard_set(),
        &MonteCarloConfig::default(),
        &progress,
    )
    .unwrap_err();

    assert!(matches!(err, SimulationError::Cancelled));
    assert_eq!(progress.status(), RunStatus::Cancelled);
    assert!(progress.completed() < progress.total());
}
