//! Scenario builder: applies sampled realizations to a baseline

use crate::model::{FinancialParameters, VariableTarget};
use crate::sampler::SampledValues;

/// Build the perturbed parameter set for one trial.
///
/// Multipliers compound when several variables scale the same field;
/// replacements apply in declaration order, so the last one wins. Fields no
/// realization targets keep their baseline value.
#[must_use]
pub fn perturb(baseline: &FinancialParameters, sampled: &SampledValues) -> FinancialParameters {
    let mut params = baseline.clone();
    for realization in &sampled.realizations {
        apply(&mut params, realization.target, realization.value);
    }
    params
}

fn apply(params: &mut FinancialParameters, target: VariableTarget, value: f64) {
    match target {
        VariableTarget::RevenueMultiplier => params.revenue_rate_per_kw_month *= value,
        VariableTarget::OpexMultiplier => params.annual_base_opex *= value,
        VariableTarget::CapexMultiplier => params.total_capex *= value,
        VariableTarget::OccupancyDelayYears => params.occupancy_delay_years += value,
        VariableTarget::DiscountRate => params.discount_rate = value,
        VariableTarget::RevenueEscalation => params.revenue_escalation = value,
        VariableTarget::OpexEscalation => params.opex_escalation = value,
        VariableTarget::TaxRate => params.tax_rate = value,
    }
}
