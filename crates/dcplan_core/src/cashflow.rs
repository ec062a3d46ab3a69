//! Deterministic discounted-cash-flow model
//!
//! Builds the year-by-year schedule for one set of financial parameters and
//! derives NPV, IRR and payback from it. The Monte Carlo orchestrator calls
//! this once per trial; callers may also use it standalone.

use crate::model::{CashflowYear, DeterministicResult, FinancialParameters, TrialOutcome};

/// Lower bound of the IRR search domain (-99%)
pub const IRR_MIN_RATE: f64 = -0.99;
/// Upper bound of the IRR search domain (+1000%)
pub const IRR_MAX_RATE: f64 = 10.0;
/// Bisection stops once the bracket is narrower than this
const IRR_TOLERANCE: f64 = 1e-12;
const IRR_MAX_ITERATIONS: usize = 200;

/// Run the cash-flow model for one scenario
#[must_use]
pub fn run_deterministic(params: &FinancialParameters) -> DeterministicResult {
    let schedule = build_schedule(params);
    let flows = cash_flows(params.total_capex, &schedule);

    DeterministicResult {
        npv: npv(params.discount_rate, &flows),
        irr: irr(&flows),
        payback_years: payback_years(params.total_capex, &schedule),
        schedule,
    }
}

/// Headline metrics only, for use inside the trial loop
#[must_use]
pub fn evaluate(params: &FinancialParameters) -> TrialOutcome {
    run_deterministic(params).outcome()
}

/// Year-by-year schedule for years 1..=`project_life_years`
#[must_use]
pub fn build_schedule(params: &FinancialParameters) -> Vec<CashflowYear> {
    let annual_depreciation = params.total_capex / f64::from(params.depreciation_years.max(1));
    let mut cumulative = -params.total_capex;

    (1..=params.project_life_years)
        .map(|year| {
            let growth_years = (year - 1) as i32;
            let occupancy = params.occupancy(year);
            let revenue = params.annual_revenue_capacity()
                * occupancy
                * (1.0 + params.revenue_escalation).powi(growth_years);
            let opex = params.annual_base_opex * (1.0 + params.opex_escalation).powi(growth_years);
            let depreciation = if year <= params.depreciation_years {
                annual_depreciation
            } else {
                0.0
            };

            // Losses carry no tax benefit
            let taxable_income = revenue - opex - depreciation;
            let tax = params.tax_rate * taxable_income.max(0.0);
            let free_cash_flow = revenue - opex - tax;
            cumulative += free_cash_flow;

            CashflowYear {
                year,
                occupancy,
                revenue,
                opex,
                depreciation,
                taxable_income,
                tax,
                free_cash_flow,
                cumulative_free_cash_flow: cumulative,
            }
        })
        .collect()
}

/// Cash-flow stream with the capital outlay at index 0
fn cash_flows(total_capex: f64, schedule: &[CashflowYear]) -> Vec<f64> {
    std::iter::once(-total_capex)
        .chain(schedule.iter().map(|y| y.free_cash_flow))
        .collect()
}

/// Net present value of a stream whose first element falls at year 0
#[must_use]
pub fn npv(rate: f64, flows: &[f64]) -> f64 {
    let discount = 1.0 + rate;
    flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / discount.powi(t as i32))
        .sum()
}

/// A value with the sign of NPV at `rate` that stays finite across the IRR
/// search domain.
///
/// Below 0% discounting divides by ever smaller powers and overflows on long
/// streams, so the stream is compounded forward to its final year instead.
/// Scaling by a positive factor keeps the sign.
fn npv_sign(rate: f64, flows: &[f64]) -> f64 {
    if rate >= 0.0 {
        return npv(rate, flows);
    }
    let growth = 1.0 + rate;
    flows.iter().fold(0.0, |acc, cf| acc * growth + cf)
}

fn has_sign_change(flows: &[f64]) -> bool {
    let mut positive = false;
    let mut negative = false;
    for cf in flows {
        positive |= *cf > 0.0;
        negative |= *cf < 0.0;
    }
    positive && negative
}

/// Internal rate of return by bisection over [`IRR_MIN_RATE`, `IRR_MAX_RATE`].
///
/// Returns `None` when the stream never changes sign, when NPV does not change
/// sign across the search domain, or when the bracket fails to shrink below
/// tolerance within the iteration budget.
#[must_use]
pub fn irr(flows: &[f64]) -> Option<f64> {
    if !has_sign_change(flows) {
        return None;
    }

    let mut low = IRR_MIN_RATE;
    let mut high = IRR_MAX_RATE;
    let mut f_low = npv_sign(low, flows);
    let f_high = npv_sign(high, flows);
    if !f_low.is_finite() || !f_high.is_finite() {
        return None;
    }
    if f_low == 0.0 {
        return Some(low);
    }
    if f_high == 0.0 {
        return Some(high);
    }
    if f_low.signum() == f_high.signum() {
        return None;
    }

    for _ in 0..IRR_MAX_ITERATIONS {
        let mid = f64::midpoint(low, high);
        let f_mid = npv_sign(mid, flows);
        if f_mid == 0.0 || (high - low) < IRR_TOLERANCE {
            return Some(mid);
        }
        if f_mid.signum() == f_low.signum() {
            low = mid;
            f_low = f_mid;
        } else {
            high = mid;
        }
    }

    None
}

/// Years until cumulative free cash flow first reaches zero.
///
/// Interpolates within the recovery year using the prior year's shortfall
/// over that year's free cash flow.
#[must_use]
pub fn payback_years(total_capex: f64, schedule: &[CashflowYear]) -> Option<f64> {
    if total_capex <= 0.0 {
        return Some(0.0);
    }

    let mut previous = -total_capex;
    for year in schedule {
        if year.cumulative_free_cash_flow >= 0.0 {
            let fraction = if year.free_cash_flow > 0.0 {
                -previous / year.free_cash_flow
            } else {
                0.0
            };
            return Some(f64::from(year.year - 1) + fraction);
        }
        previous = year.cumulative_free_cash_flow;
    }
    None
}
