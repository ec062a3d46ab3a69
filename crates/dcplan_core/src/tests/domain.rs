//! Tests for realizations outside a target's admissible range and for
//! undefined IRRs on projects that do recover their capital

use crate::config::{FinancialParametersBuilder, MonteCarloConfig};
use crate::error::{SimulationError, ValidationError};
use crate::model::{
    FinancialParameters, MonteCarloProgress, RunStatus, StochasticVariable, VariableDistribution,
    VariableId, VariableTarget,
};
use crate::sampler::{Sampler, trial_rng};
use crate::simulation::{run, run_with_progress};

fn wide_discount_rate() -> StochasticVariable {
    StochasticVariable::new(
        "discount_rate",
        "Discount Rate",
        VariableDistribution::Normal {
            mean: 0.10,
            std_dev: 1.0,
        },
        VariableTarget::DiscountRate,
    )
}

#[test]
fn test_out_of_domain_draws_leave_trials_undefined() {
    let baseline = FinancialParameters::reference();
    let variables = vec![wide_discount_rate()];
    let n = 2_000;

    let result = run(&baseline, &variables, n, 42).unwrap();

    // Replay the draws to know which trials crossed -100%
    let sampler = Sampler::new(&variables).unwrap();
    let mut crossed = 0;
    for trial in 0..n {
        let rate = sampler.sample(&mut trial_rng(42, trial)).realizations[0].value;
        if rate <= -1.0 {
            crossed += 1;
            assert!(result.npv.values[trial].is_nan(), "trial {trial} at r={rate}");
            assert!(result.irr.values[trial].is_nan());
            assert!(result.payback_years.values[trial].is_nan());
        } else {
            assert!(result.npv.values[trial].is_finite(), "trial {trial} at r={rate}");
        }
    }

    assert!(crossed > 0);
    assert_eq!(result.out_of_domain_trials, crossed);
    assert_eq!(result.npv.summary.excluded, crossed);
    assert_eq!(result.npv.summary.count, n - crossed);
    let histogram_total: usize = result.npv.histogram.iter().map(|b| b.count).sum();
    assert_eq!(histogram_total, n - crossed);

    // Probabilities are taken over the evaluated trials only
    let negative = result
        .npv
        .values
        .iter()
        .filter(|v| v.is_finite() && **v < 0.0)
        .count();
    let expected = negative as f64 / (n - crossed) as f64;
    assert!((result.probability_negative_npv - expected).abs() < 1e-12);

    let last = result.convergence_history.last().unwrap();
    assert_eq!(last.mean_npv.to_bits(), result.mean_npv().unwrap().to_bits());
}

#[test]
fn test_admissible_run_has_no_out_of_domain_trials() {
    let variables: Vec<_> = StochasticVariable::standard_set()
        .into_iter()
        .map(|v| v.enabled(true))
        .collect();
    let result = run(&FinancialParameters::reference(), &variables, 1_000, 42).unwrap();
    assert_eq!(result.out_of_domain_trials, 0);
    assert_eq!(result.npv.summary.excluded, 0);
}

#[test]
fn test_support_outside_domain_fails_run() {
    let variables = vec![StochasticVariable::new(
        "tax",
        "Tax",
        VariableDistribution::Uniform { min: 1.5, max: 2.0 },
        VariableTarget::TaxRate,
    )];
    let progress = MonteCarloProgress::new();
    let err = run_with_progress(
        &FinancialParameters::reference(),
        &variables,
        &MonteCarloConfig::default(),
        &progress,
    )
    .unwrap_err();

    assert_eq!(
        err,
        SimulationError::Validation(ValidationError::DistributionOutsideDomain {
            variable: VariableId::from("tax"),
            target: "Tax rate",
            domain: "[0, 1]",
        })
    );
    assert_eq!(progress.status(), RunStatus::Failed);
    assert_eq!(progress.completed(), 0);
}

#[test]
fn test_recovered_project_without_irr_clears_hurdle() {
    // No capital outlay: every cash flow is positive, so IRR has no root,
    // yet the project pays back at once
    let baseline = FinancialParametersBuilder::new().capex(0.0).build().unwrap();

    let result = run(&baseline, &[StochasticVariable::revenue_multiplier()], 200, 42).unwrap();

    assert_eq!(result.irr.summary.excluded, 200);
    let payback = result.payback_years.summary.stats.unwrap();
    assert_eq!(payback.median, 0.0);
    assert_eq!(result.probability_irr_below_hurdle, 0.0);
    assert_eq!(result.probability_negative_npv, 0.0);
}
