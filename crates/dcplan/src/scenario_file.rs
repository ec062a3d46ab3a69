//! Scenario files
//!
//! A scenario file is a YAML document holding the baseline parameters, the
//! stochastic variables and optional Monte Carlo settings:
//!
//! ```yaml
//! parameters:
//!   total_capex: 10000000.0
//!   annual_base_opex: 1000000.0
//!   revenue_rate_per_kw_month: 150.0
//!   capacity_kw: 2500.0
//!   discount_rate: 0.10
//!   project_life_years: 10
//!   revenue_escalation: 0.03
//!   opex_escalation: 0.03
//!   occupancy_ramp: [0.30, 0.60, 0.85, 0.95]
//!   tax_rate: 0.21
//!   depreciation_years: 7
//! variables:
//!   - id: revenue_multiplier
//!     name: Revenue multiplier
//!     target: revenue_multiplier
//!     distribution: { type: Uniform, min: 0.85, max: 1.15 }
//! monte_carlo:
//!   iterations: 10000
//!   seed: 42
//! ```

use std::fs;
use std::path::Path;

use dcplan_core::{ScenarioConfig, ValidationError};

use crate::util::io::atomic_write;

/// Error types for scenario file operations
#[derive(Debug)]
pub enum ScenarioFileError {
    Io(String),
    Parse(String),
    Serialize(String),
    Invalid(ValidationError),
}

impl std::fmt::Display for ScenarioFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioFileError::Io(msg) => write!(f, "IO error: {msg}"),
            ScenarioFileError::Parse(msg) => write!(f, "Parse error: {msg}"),
            ScenarioFileError::Serialize(msg) => write!(f, "Serialization error: {msg}"),
            ScenarioFileError::Invalid(e) => write!(f, "Invalid scenario: {e}"),
        }
    }
}

impl std::error::Error for ScenarioFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioFileError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

/// Parse and validate a scenario from YAML
pub fn from_yaml(yaml: &str) -> Result<ScenarioConfig, ScenarioFileError> {
    let scenario: ScenarioConfig =
        serde_saphyr::from_str(yaml).map_err(|e| ScenarioFileError::Parse(e.to_string()))?;
    scenario.validate().map_err(ScenarioFileError::Invalid)?;
    Ok(scenario)
}

pub fn to_yaml(scenario: &ScenarioConfig) -> Result<String, ScenarioFileError> {
    serde_saphyr::to_string(scenario).map_err(|e| ScenarioFileError::Serialize(e.to_string()))
}

/// Load a scenario file, or the reference scenario when no path is given
pub fn load_scenario(path: Option<&Path>) -> Result<ScenarioConfig, ScenarioFileError> {
    let Some(path) = path else {
        tracing::debug!("no scenario file given, using the reference facility");
        return Ok(ScenarioConfig::reference());
    };

    let content = fs::read_to_string(path).map_err(|e| {
        ScenarioFileError::Io(format!("Failed to read {}: {e}", path.display()))
    })?;
    let scenario = from_yaml(&content)?;
    tracing::info!(
        path = %path.display(),
        variables = scenario.variables.len(),
        "loaded scenario"
    );
    Ok(scenario)
}

pub fn save_scenario(path: &Path, scenario: &ScenarioConfig) -> Result<(), ScenarioFileError> {
    let yaml = to_yaml(scenario)?;
    atomic_write(path, &yaml)
        .map_err(|e| ScenarioFileError::Io(format!("Failed to write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcplan_core::{FinancialParameters, VariableDistribution, VariableTarget};
    use tempfile::tempdir;

    const MINIMAL: &str = r"
parameters:
  total_capex: 10000000.0
  annual_base_opex: 1000000.0
  revenue_rate_per_kw_month: 150.0
  capacity_kw: 2500.0
  discount_rate: 0.10
  project_life_years: 10
  revenue_escalation: 0.03
  opex_escalation: 0.03
  occupancy_ramp: [0.30, 0.60, 0.85, 0.95]
  tax_rate: 0.21
  depreciation_years: 7
variables:
  - id: revenue_multiplier
    name: Revenue multiplier
    target: revenue_multiplier
    distribution:
      type: Uniform
      min: 0.85
      max: 1.15
  - id: capex_overrun
    name: CAPEX overrun
    target: capex_multiplier
    enabled: false
    distribution:
      type: Triangular
      min: 0.95
      mode: 1.0
      max: 1.3
monte_carlo:
  iterations: 2000
";

    #[test]
    fn test_parse_minimal_document() {
        let scenario = from_yaml(MINIMAL).unwrap();
        assert_eq!(scenario.parameters, FinancialParameters::reference());
        assert_eq!(scenario.variables.len(), 2);
        assert!(scenario.variables[0].enabled);
        assert!(!scenario.variables[1].enabled);
        assert_eq!(scenario.variables[1].target, VariableTarget::CapexMultiplier);
        assert_eq!(
            scenario.variables[0].distribution,
            VariableDistribution::Uniform {
                min: 0.85,
                max: 1.15
            }
        );
        assert_eq!(scenario.monte_carlo.iterations, 2000);
        assert_eq!(scenario.monte_carlo.seed, 42);
    }

    #[test]
    fn test_invalid_distribution_rejected() {
        let yaml = MINIMAL.replace("min: 0.85", "min: 1.50");
        let err = from_yaml(&yaml).unwrap_err();
        assert!(matches!(
            err,
            ScenarioFileError::Invalid(ValidationError::InvalidDistributionParameters { .. })
        ));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = from_yaml("parameters: [not, a, map]").unwrap_err();
        assert!(matches!(err, ScenarioFileError::Parse(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reference.yaml");
        let scenario = ScenarioConfig::reference();

        save_scenario(&path, &scenario).unwrap();
        let loaded = load_scenario(Some(&path)).unwrap();
        assert_eq!(loaded, scenario);
    }

    #[test]
    fn test_missing_file_and_default() {
        let dir = tempdir().unwrap();
        let err = load_scenario(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ScenarioFileError::Io(_)));

        assert_eq!(load_scenario(None).unwrap(), ScenarioConfig::reference());
    }
}
