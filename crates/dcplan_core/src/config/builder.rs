//! Financial Parameters Builder
//!
//! Fluent construction of a baseline starting from the reference facility,
//! validated on `build()`.
//!
//! # Example
//!
//! ```
//! use dcplan_core::config::FinancialParametersBuilder;
//!
//! # fn main() -> Result<(), dcplan_core::ValidationError> {
//! let params = FinancialParametersBuilder::new()
//!     .capex(40_000_000.0)
//!     .opex(3_500_000.0)
//!     .capacity_kw(8_000.0)
//!     .revenue_rate(135.0)
//!     .discount_rate(0.09)
//!     .project_life(15)
//!     .escalation(0.025)
//!     .occupancy_ramp([0.25, 0.55, 0.80, 0.92])
//!     .tax_rate(0.25)
//!     .depreciation_years(10)
//!     .build()?;
//! assert_eq!(params.project_life_years, 15);
//! # Ok(())
//! # }
//! ```

use crate::error::ValidationError;
use crate::model::FinancialParameters;

/// Builder for [`FinancialParameters`]
#[derive(Debug, Clone)]
pub struct FinancialParametersBuilder {
    params: FinancialParameters,
}

impl Default for FinancialParametersBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FinancialParametersBuilder {
    /// Start from the reference facility
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: FinancialParameters::reference(),
        }
    }

    /// Start from an existing parameter set
    #[must_use]
    pub fn from_params(params: FinancialParameters) -> Self {
        Self { params }
    }

    // ========================================================================
    // Costs
    // ========================================================================

    #[must_use]
    pub fn capex(mut self, total_capex: f64) -> Self {
        self.params.total_capex = total_capex;
        self
    }

    #[must_use]
    pub fn opex(mut self, annual_base_opex: f64) -> Self {
        self.params.annual_base_opex = annual_base_opex;
        self
    }

    // ========================================================================
    // Revenue
    // ========================================================================

    #[must_use]
    pub fn capacity_kw(mut self, capacity_kw: f64) -> Self {
        self.params.capacity_kw = capacity_kw;
        self
    }

    /// Revenue per kW per month at full occupancy
    #[must_use]
    pub fn revenue_rate(mut self, per_kw_month: f64) -> Self {
        self.params.revenue_rate_per_kw_month = per_kw_month;
        self
    }

    #[must_use]
    pub fn occupancy_ramp(mut self, ramp: impl IntoIterator<Item = f64>) -> Self {
        self.params.occupancy_ramp = ramp.into_iter().collect();
        self
    }

    #[must_use]
    pub fn occupancy_delay(mut self, years: f64) -> Self {
        self.params.occupancy_delay_years = years;
        self
    }

    // ========================================================================
    // Rates and horizon
    // ========================================================================

    #[must_use]
    pub fn discount_rate(mut self, rate: f64) -> Self {
        self.params.discount_rate = rate;
        self
    }

    #[must_use]
    pub fn project_life(mut self, years: u32) -> Self {
        self.params.project_life_years = years;
        self
    }

    #[must_use]
    pub fn revenue_escalation(mut self, rate: f64) -> Self {
        self.params.revenue_escalation = rate;
        self
    }

    #[must_use]
    pub fn opex_escalation(mut self, rate: f64) -> Self {
        self.params.opex_escalation = rate;
        self
    }

    /// Set revenue and OPEX escalation together
    #[must_use]
    pub fn escalation(self, rate: f64) -> Self {
        self.revenue_escalation(rate).opex_escalation(rate)
    }

    #[must_use]
    pub fn tax_rate(mut self, rate: f64) -> Self {
        self.params.tax_rate = rate;
        self
    }

    #[must_use]
    pub fn depreciation_years(mut self, years: u32) -> Self {
        self.params.depreciation_years = years;
        self
    }

    /// Validate and return the parameters
    pub fn build(self) -> Result<FinancialParameters, ValidationError> {
        self.params.validate()?;
        Ok(self.params)
    }
}
