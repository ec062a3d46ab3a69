//! Baseline financial parameters for a facility investment

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Financial inputs to one discounted-cash-flow evaluation.
///
/// Values arrive from the planning collaborators (CAPEX costing, country
/// reference data, staffing) as plain scalars. A trial never mutates the
/// baseline; the scenario builder produces a perturbed copy instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialParameters {
    /// Up-front capital outlay, spent at year 0
    pub total_capex: f64,
    /// Operating expense in year 1, before escalation
    pub annual_base_opex: f64,
    /// Revenue per kW of capacity per month at full occupancy
    pub revenue_rate_per_kw_month: f64,
    /// Sellable IT capacity in kW
    pub capacity_kw: f64,
    pub discount_rate: f64,
    pub project_life_years: u32,
    /// Annual revenue escalation (0.03 = 3%)
    pub revenue_escalation: f64,
    /// Annual operating-cost escalation (0.03 = 3%)
    pub opex_escalation: f64,
    /// Fractional utilization for years 1, 2, ...; the last entry is held for
    /// every later year
    pub occupancy_ramp: Vec<f64>,
    /// Shift applied to the ramp index, in years. Positive values delay
    /// lease-up; the facility is empty before the shifted ramp begins.
    #[serde(default)]
    pub occupancy_delay_years: f64,
    pub tax_rate: f64,
    /// Straight-line depreciation period for the capital outlay
    pub depreciation_years: u32,
}

impl FinancialParameters {
    /// The 2.5 MW reference facility used for examples and calibration.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            total_capex: 10_000_000.0,
            annual_base_opex: 1_000_000.0,
            revenue_rate_per_kw_month: 150.0,
            capacity_kw: 2_500.0,
            discount_rate: 0.10,
            project_life_years: 10,
            revenue_escalation: 0.03,
            opex_escalation: 0.03,
            occupancy_ramp: vec![0.30, 0.60, 0.85, 0.95],
            occupancy_delay_years: 0.0,
            tax_rate: 0.21,
            depreciation_years: 7,
        }
    }

    /// Occupancy fraction for a 1-based project year.
    ///
    /// Fractional delays interpolate linearly between neighbouring ramp
    /// entries; the year before the ramp starts blends in from zero.
    #[must_use]
    pub fn occupancy(&self, year: u32) -> f64 {
        let Some(&first) = self.occupancy_ramp.first() else {
            return 0.0;
        };
        let position = f64::from(year.saturating_sub(1)) - self.occupancy_delay_years;
        if position <= -1.0 {
            return 0.0;
        }
        if position < 0.0 {
            return first * (1.0 + position);
        }

        let last = self.occupancy_ramp.len() - 1;
        let lower = position.floor() as usize;
        if lower >= last {
            return self.occupancy_ramp[last];
        }
        let weight = position - lower as f64;
        let a = self.occupancy_ramp[lower];
        let b = self.occupancy_ramp[lower + 1];
        a + (b - a) * weight
    }

    /// Annual revenue at full occupancy, before escalation.
    #[must_use]
    pub fn annual_revenue_capacity(&self) -> f64 {
        self.capacity_kw * self.revenue_rate_per_kw_month * 12.0
    }

    /// Check that the baseline describes a project the cash-flow model can evaluate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let finite = [
            ("total_capex", self.total_capex),
            ("annual_base_opex", self.annual_base_opex),
            ("revenue_rate_per_kw_month", self.revenue_rate_per_kw_month),
            ("capacity_kw", self.capacity_kw),
            ("discount_rate", self.discount_rate),
            ("revenue_escalation", self.revenue_escalation),
            ("opex_escalation", self.opex_escalation),
            ("occupancy_delay_years", self.occupancy_delay_years),
            ("tax_rate", self.tax_rate),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ValidationError::InvalidParameter {
                    field,
                    value,
                    reason: "must be finite",
                });
            }
        }

        let non_negative = [
            ("total_capex", self.total_capex),
            ("annual_base_opex", self.annual_base_opex),
            ("revenue_rate_per_kw_month", self.revenue_rate_per_kw_month),
            ("capacity_kw", self.capacity_kw),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ValidationError::InvalidParameter {
                    field,
                    value,
                    reason: "must not be negative",
                });
            }
        }

        let rates = [
            ("discount_rate", self.discount_rate),
            ("revenue_escalation", self.revenue_escalation),
            ("opex_escalation", self.opex_escalation),
        ];
        for (field, value) in rates {
            if value <= -1.0 {
                return Err(ValidationError::InvalidParameter {
                    field,
                    value,
                    reason: "must be greater than -100%",
                });
            }
        }

        if !(0.0..=1.0).contains(&self.tax_rate) {
            return Err(ValidationError::InvalidParameter {
                field: "tax_rate",
                value: self.tax_rate,
                reason: "must lie in [0, 1]",
            });
        }
        if self.project_life_years == 0 {
            return Err(ValidationError::InvalidParameter {
                field: "project_life_years",
                value: 0.0,
                reason: "must be at least one year",
            });
        }
        if self.depreciation_years == 0 {
            return Err(ValidationError::InvalidParameter {
                field: "depreciation_years",
                value: 0.0,
                reason: "must be at least one year",
            });
        }
        if self.occupancy_ramp.is_empty() {
            return Err(ValidationError::EmptyOccupancyRamp);
        }
        if let Some(&bad) = self
            .occupancy_ramp
            .iter()
            .find(|v| !(0.0..=1.0).contains(*v))
        {
            return Err(ValidationError::InvalidParameter {
                field: "occupancy_ramp",
                value: bad,
                reason: "each entry must lie in [0, 1]",
            });
        }
        Ok(())
    }
}

impl Default for FinancialParameters {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupancy_plateau() {
        let params = FinancialParameters::reference();
        assert_eq!(params.occupancy(1), 0.30);
        assert_eq!(params.occupancy(2), 0.60);
        assert_eq!(params.occupancy(4), 0.95);
        // Beyond the ramp the last value holds
        assert_eq!(params.occupancy(5), 0.95);
        assert_eq!(params.occupancy(10), 0.95);
    }

    #[test]
    fn test_occupancy_delay() {
        let params = FinancialParameters {
            occupancy_delay_years: 1.0,
            ..FinancialParameters::reference()
        };
        assert_eq!(params.occupancy(1), 0.0);
        assert_eq!(params.occupancy(2), 0.30);
        assert_eq!(params.occupancy(3), 0.60);

        let half = FinancialParameters {
            occupancy_delay_years: 0.5,
            ..FinancialParameters::reference()
        };
        assert!((half.occupancy(1) - 0.15).abs() < 1e-12);
        assert!((half.occupancy(2) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut params = FinancialParameters::reference();
        assert!(params.validate().is_ok());

        params.occupancy_ramp.clear();
        assert_eq!(params.validate(), Err(ValidationError::EmptyOccupancyRamp));

        let params = FinancialParameters {
            project_life_years: 0,
            ..FinancialParameters::reference()
        };
        assert!(matches!(
            params.validate(),
            Err(ValidationError::InvalidParameter {
                field: "project_life_years",
                ..
            })
        ));

        let params = FinancialParameters {
            discount_rate: -1.0,
            ..FinancialParameters::reference()
        };
        assert!(params.validate().is_err());
    }
}
