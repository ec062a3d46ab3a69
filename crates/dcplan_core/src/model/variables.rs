//! Stochastic variables: uncertain inputs and the distributions they follow

use serde::{Deserialize, Serialize};

use super::ids::VariableId;

/// Standard normal quantile at 0.90, used for the P10/P90 tornado bounds
const Z_90: f64 = 1.281_551_565_544_600_4;

fn default_true() -> bool {
    true
}

/// Probability distribution of a stochastic variable.
///
/// The supported set is closed; arbitrary user-defined distributions are not
/// part of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VariableDistribution {
    Uniform { min: f64, max: f64 },
    Normal { mean: f64, std_dev: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
}

impl VariableDistribution {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Uniform { .. } => "uniform",
            Self::Normal { .. } => "normal",
            Self::Triangular { .. } => "triangular",
        }
    }

    /// Reason the parameters cannot be sampled, if any.
    #[must_use]
    pub fn invalid_reason(&self) -> Option<String> {
        match *self {
            Self::Uniform { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    Some(format!("bounds must be finite (min={min}, max={max})"))
                } else if min > max {
                    Some(format!("min ({min}) must not exceed max ({max})"))
                } else {
                    None
                }
            }
            Self::Normal { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() {
                    Some(format!(
                        "mean and std_dev must be finite (mean={mean}, std_dev={std_dev})"
                    ))
                } else if std_dev < 0.0 {
                    Some(format!("std_dev ({std_dev}) must not be negative"))
                } else {
                    None
                }
            }
            Self::Triangular { min, mode, max } => {
                if !min.is_finite() || !mode.is_finite() || !max.is_finite() {
                    Some(format!(
                        "bounds must be finite (min={min}, mode={mode}, max={max})"
                    ))
                } else if min > max {
                    Some(format!("min ({min}) must not exceed max ({max})"))
                } else if mode < min || mode > max {
                    Some(format!("mode ({mode}) must lie within [{min}, {max}]"))
                } else {
                    None
                }
            }
        }
    }

    /// Expected value of the distribution
    #[must_use]
    pub fn mean(&self) -> f64 {
        match *self {
            Self::Uniform { min, max } => f64::midpoint(min, max),
            Self::Normal { mean, .. } => mean,
            Self::Triangular { min, mode, max } => (min + mode + max) / 3.0,
        }
    }

    /// Values at the 10th and 90th percentiles.
    #[must_use]
    pub fn p10_p90(&self) -> (f64, f64) {
        match *self {
            Self::Uniform { min, max } => {
                let span = max - min;
                (min + 0.1 * span, min + 0.9 * span)
            }
            Self::Normal { mean, std_dev } => (mean - Z_90 * std_dev, mean + Z_90 * std_dev),
            Self::Triangular { .. } => (self.triangular_quantile(0.1), self.triangular_quantile(0.9)),
        }
    }

    fn triangular_quantile(&self, p: f64) -> f64 {
        let Self::Triangular { min, mode, max } = *self else {
            return f64::NAN;
        };
        let range = max - min;
        if range <= 0.0 {
            return min;
        }
        if p * range < mode - min {
            min + (p * range * (mode - min)).sqrt()
        } else {
            max - ((1.0 - p) * range * (max - mode)).sqrt()
        }
    }
}

/// The financial parameter a stochastic variable perturbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableTarget {
    /// Scales the revenue rate per kW-month
    RevenueMultiplier,
    /// Scales the base operating expense
    OpexMultiplier,
    /// Scales the total capital outlay
    CapexMultiplier,
    /// Shifts the occupancy ramp by the sampled number of years
    OccupancyDelayYears,
    /// Replaces the discount rate
    DiscountRate,
    /// Replaces the revenue escalation rate
    RevenueEscalation,
    /// Replaces the operating-cost escalation rate
    OpexEscalation,
    /// Replaces the tax rate
    TaxRate,
}

impl VariableTarget {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::RevenueMultiplier => "Revenue rate (x)",
            Self::OpexMultiplier => "OPEX (x)",
            Self::CapexMultiplier => "CAPEX (x)",
            Self::OccupancyDelayYears => "Occupancy delay",
            Self::DiscountRate => "Discount rate",
            Self::RevenueEscalation => "Revenue escalation",
            Self::OpexEscalation => "OPEX escalation",
            Self::TaxRate => "Tax rate",
        }
    }

    /// Whether a realization keeps the perturbed field inside the range the
    /// cash-flow model accepts.
    ///
    /// Multipliers keep non-negative fields non-negative; rates must stay
    /// above -100%; the tax rate must lie in [0, 1]. Every admissible range
    /// is an interval.
    #[must_use]
    pub fn admits(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            Self::RevenueMultiplier | Self::OpexMultiplier | Self::CapexMultiplier => value >= 0.0,
            Self::OccupancyDelayYears => true,
            Self::DiscountRate | Self::RevenueEscalation | Self::OpexEscalation => value > -1.0,
            Self::TaxRate => (0.0..=1.0).contains(&value),
        }
    }

    /// Admissible range in interval notation
    #[must_use]
    pub fn domain(&self) -> &'static str {
        match self {
            Self::RevenueMultiplier | Self::OpexMultiplier | Self::CapexMultiplier => "[0, inf)",
            Self::OccupancyDelayYears => "(-inf, inf)",
            Self::DiscountRate | Self::RevenueEscalation | Self::OpexEscalation => "(-1, inf)",
            Self::TaxRate => "[0, 1]",
        }
    }

    /// False when every finite realization is admissible
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        !matches!(self, Self::OccupancyDelayYears)
    }
}

/// An uncertain input to the Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticVariable {
    pub id: VariableId,
    pub name: String,
    pub distribution: VariableDistribution,
    pub target: VariableTarget,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
}

impl StochasticVariable {
    #[must_use]
    pub fn new(
        id: impl Into<VariableId>,
        name: impl Into<String>,
        distribution: VariableDistribution,
        target: VariableTarget,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            distribution,
            target,
            enabled: true,
            unit: String::new(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    // ========================================================================
    // Standard variables
    // ========================================================================

    /// Market pricing uncertainty: ±15% on the contracted rate.
    #[must_use]
    pub fn revenue_multiplier() -> Self {
        Self::new(
            "revenue_multiplier",
            "Revenue Multiplier",
            VariableDistribution::Uniform {
                min: 0.85,
                max: 1.15,
            },
            VariableTarget::RevenueMultiplier,
        )
        .unit("x")
        .description("Scales the achieved colocation rate per kW-month")
    }

    #[must_use]
    pub fn opex_multiplier() -> Self {
        Self::new(
            "opex_multiplier",
            "OPEX Multiplier",
            VariableDistribution::Normal {
                mean: 1.0,
                std_dev: 0.08,
            },
            VariableTarget::OpexMultiplier,
        )
        .unit("x")
        .description("Energy, staffing and maintenance cost variance")
    }

    /// Construction overruns are skewed: small savings, large overruns.
    #[must_use]
    pub fn capex_overrun() -> Self {
        Self::new(
            "capex_overrun",
            "CAPEX Overrun",
            VariableDistribution::Triangular {
                min: 0.95,
                mode: 1.0,
                max: 1.30,
            },
            VariableTarget::CapexMultiplier,
        )
        .unit("x")
        .description("Construction cost outcome relative to the estimate")
    }

    #[must_use]
    pub fn occupancy_delay() -> Self {
        Self::new(
            "occupancy_delay",
            "Occupancy Delay",
            VariableDistribution::Triangular {
                min: 0.0,
                mode: 0.25,
                max: 1.5,
            },
            VariableTarget::OccupancyDelayYears,
        )
        .unit("years")
        .description("Slip in customer lease-up against the planned ramp")
    }

    #[must_use]
    pub fn discount_rate() -> Self {
        Self::new(
            "discount_rate",
            "Discount Rate",
            VariableDistribution::Normal {
                mean: 0.10,
                std_dev: 0.015,
            },
            VariableTarget::DiscountRate,
        )
        .unit("%")
        .description("Cost of capital at financial close")
    }

    #[must_use]
    pub fn revenue_escalation() -> Self {
        Self::new(
            "revenue_escalation",
            "Revenue Escalation",
            VariableDistribution::Triangular {
                min: 0.0,
                mode: 0.03,
                max: 0.05,
            },
            VariableTarget::RevenueEscalation,
        )
        .unit("%/yr")
        .description("Annual price escalator achieved on renewals")
    }

    /// The standard variable set. Only the revenue multiplier starts enabled.
    #[must_use]
    pub fn standard_set() -> Vec<Self> {
        vec![
            Self::revenue_multiplier(),
            Self::opex_multiplier().enabled(false),
            Self::capex_overrun().enabled(false),
            Self::occupancy_delay().enabled(false),
            Self::discount_rate().enabled(false),
            Self::revenue_escalation().enabled(false),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_reasons() {
        assert!(
            VariableDistribution::Uniform { min: 1.2, max: 0.8 }
                .invalid_reason()
                .is_some()
        );
        assert!(
            VariableDistribution::Normal {
                mean: 1.0,
                std_dev: -0.1
            }
            .invalid_reason()
            .is_some()
        );
        assert!(
            VariableDistribution::Triangular {
                min: 0.0,
                mode: 2.0,
                max: 1.0
            }
            .invalid_reason()
            .is_some()
        );
        // Degenerate but valid
        assert!(
            VariableDistribution::Uniform { min: 1.0, max: 1.0 }
                .invalid_reason()
                .is_none()
        );
    }

    #[test]
    fn test_p10_p90() {
        let (lo, hi) = VariableDistribution::Uniform {
            min: 0.85,
            max: 1.15,
        }
        .p10_p90();
        assert!((lo - 0.88).abs() < 1e-12);
        assert!((hi - 1.12).abs() < 1e-12);

        let (lo, hi) = VariableDistribution::Normal {
            mean: 0.0,
            std_dev: 1.0,
        }
        .p10_p90();
        assert!((lo + 1.2815515655446004).abs() < 1e-12);
        assert!((hi - 1.2815515655446004).abs() < 1e-12);

        // Symmetric triangular: quantiles mirror around the mode
        let (lo, hi) = VariableDistribution::Triangular {
            min: 0.0,
            mode: 1.0,
            max: 2.0,
        }
        .p10_p90();
        assert!((lo - 0.2_f64.sqrt()).abs() < 1e-12);
        assert!((hi - (2.0 - 0.2_f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_standard_set() {
        let set = StochasticVariable::standard_set();
        assert_eq!(set.len(), 6);
        assert_eq!(set.iter().filter(|v| v.enabled).count(), 1);
        assert_eq!(set[0].id, VariableId::from("revenue_multiplier"));
        assert!(set.iter().all(|v| v.distribution.invalid_reason().is_none()));
        assert!(set.iter().all(|v| v.target.admits(v.distribution.mean())));
    }

    #[test]
    fn test_target_domains() {
        assert!(VariableTarget::CapexMultiplier.admits(0.0));
        assert!(!VariableTarget::CapexMultiplier.admits(-0.01));
        assert!(VariableTarget::DiscountRate.admits(-0.99));
        assert!(!VariableTarget::DiscountRate.admits(-1.0));
        assert!(!VariableTarget::RevenueEscalation.admits(-1.5));
        assert!(VariableTarget::TaxRate.admits(1.0));
        assert!(!VariableTarget::TaxRate.admits(1.5));
        assert!(VariableTarget::OccupancyDelayYears.admits(-3.0));
        assert!(!VariableTarget::OccupancyDelayYears.is_bounded());
        assert!(!VariableTarget::OpexMultiplier.admits(f64::NAN));
    }

    #[test]
    fn test_serde_tagging() {
        let var = StochasticVariable::capex_overrun();
        let json = serde_json::to_string(&var).unwrap();
        assert!(json.contains("\"type\":\"Triangular\""));
        assert!(json.contains("\"target\":\"capex_multiplier\""));
        let back: StochasticVariable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, var);
    }
}
