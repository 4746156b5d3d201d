//! Activity times factor
//!
//! The plain "activity data × emission factor" method shared by many process sources:
//! consumed electrodes and anodes, flared gas, carbon fixed in products. A gas with a
//! GWP other than one may be named to convert the result to CO2e.

use ghg_core::factors::FactorRequirement;
use ghg_core::formula::{Formula, FormulaSpec, InputState, OutputState};
use ghg_core::standard_factors::categories::{GWP, PROCESS};
use ghg_core::standard_factors::CO2_PER_CARBON;
use ghg_core::standard_indicators::{IND_ACTIVITY, IND_EMISSION, IND_EMISSION_FACTOR, IND_GWP};
use ghg_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

const FACTOR: &str = "factor";
const GWP_FACTOR: &str = "gwp";

/// Parameters for activity × factor sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityFactorParameters {
    /// Registry category of the factor
    pub factor_category: String,
    /// Registry key of the factor
    pub factor_key: String,
    /// Entity attribute that overrides `factor_key` when present
    pub key_attribute: Option<String>,
    pub default_factor: FloatValue,
    pub factor_unit: String,
    /// Gas whose GWP converts the result to CO2e; `None` for CO2
    pub gas: Option<String>,
    /// The factor is a carbon content (tC per unit); the result is converted with 44/12
    pub carbon_basis: bool,
}

impl Default for ActivityFactorParameters {
    fn default() -> Self {
        Self {
            factor_category: PROCESS.to_string(),
            factor_key: String::new(),
            key_attribute: None,
            default_factor: 0.0,
            factor_unit: "tCO2/t".to_string(),
            gas: None,
            carbon_basis: false,
        }
    }
}

impl ActivityFactorParameters {
    /// A process factor with a fixed registry key.
    pub fn process(key: &str, default_factor: FloatValue, unit: &str) -> Self {
        Self {
            factor_key: key.to_string(),
            default_factor,
            factor_unit: unit.to_string(),
            ..Default::default()
        }
    }
}

/// Emission proportional to an activity
///
/// $$ E = \max(0, AD \cdot EF) \cdot GWP $$
///
/// With `carbon_basis`, $EF$ is a carbon content and $E$ is further multiplied by 44/12.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityFactor {
    #[serde(flatten)]
    parameters: ActivityFactorParameters,
}

impl ActivityFactor {
    pub fn from_parameters(parameters: ActivityFactorParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate_emission(
        &self,
        activity: FloatValue,
        factor: FloatValue,
        gwp: FloatValue,
    ) -> FloatValue {
        let emission = (activity * factor).max(0.0) * gwp;
        if self.parameters.carbon_basis {
            emission * CO2_PER_CARBON
        } else {
            emission
        }
    }
}

#[typetag::serde]
impl Formula for ActivityFactor {
    fn spec(&self) -> FormulaSpec {
        let parameters = &self.parameters;
        let factor = match &parameters.key_attribute {
            Some(attribute) => FactorRequirement::by_attribute(
                FACTOR,
                parameters.factor_category.clone(),
                attribute.clone(),
                parameters.default_factor,
                parameters.factor_unit.clone(),
            )
            .with_fallback_key(parameters.factor_key.clone()),
            None => FactorRequirement::fixed(
                FACTOR,
                parameters.factor_category.clone(),
                parameters.factor_key.clone(),
                parameters.default_factor,
                parameters.factor_unit.clone(),
            ),
        };

        let mut spec = FormulaSpec::new()
            .input(IND_ACTIVITY.key)
            .factor(factor.with_override(IND_EMISSION_FACTOR.key));
        if let Some(gas) = &parameters.gas {
            spec = spec.factor(
                FactorRequirement::fixed(GWP_FACTOR, GWP, gas.clone(), 1.0, "tCO2e/t")
                    .with_override(IND_GWP.key),
            );
        }
        spec.output(IND_EMISSION.key)
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        let gwp = if self.parameters.gas.is_some() {
            inputs.factor(GWP_FACTOR)
        } else {
            1.0
        };
        let emission =
            self.calculate_emission(inputs.get(IND_ACTIVITY.key), inputs.factor(FACTOR), gwp);
        OutputState::from([(IND_EMISSION.key.to_string(), emission)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghg_core::factors::KeySource;
    use is_close::is_close;

    #[test]
    fn test_co2_source() {
        let formula =
            ActivityFactor::from_parameters(ActivityFactorParameters::process("electrode", 3.663, "tCO2/t"));
        let inputs = InputState::new()
            .with_value(IND_ACTIVITY.key, 2.0)
            .with_factor(FACTOR, 3.663);
        assert!(is_close!(formula.evaluate(&inputs)[IND_EMISSION.key], 7.326));
        assert_eq!(formula.spec().factors.len(), 1);
    }

    #[test]
    fn test_non_co2_gas_is_weighted() {
        let formula = ActivityFactor::from_parameters(ActivityFactorParameters {
            gas: Some("N2O".to_string()),
            ..ActivityFactorParameters::process("nitric_acid", 0.008, "tN2O/t")
        });
        let inputs = InputState::new()
            .with_value(IND_ACTIVITY.key, 1000.0)
            .with_factor(FACTOR, 0.008)
            .with_factor(GWP_FACTOR, 310.0);
        assert!(is_close!(formula.evaluate(&inputs)[IND_EMISSION.key], 2480.0));
    }

    #[test]
    fn test_negative_activity_is_floored() {
        let formula = ActivityFactor::from_parameters(Default::default());
        assert_eq!(formula.calculate_emission(-1.0, 2.0, 1.0), 0.0);
    }

    #[test]
    fn test_carbon_basis() {
        let formula = ActivityFactor::from_parameters(ActivityFactorParameters {
            carbon_basis: true,
            ..ActivityFactorParameters::process("crude_steel_carbon", 0.0154, "tC/t")
        });
        assert!(is_close!(formula.calculate_emission(1000.0, 0.0154, 1.0), 15.4 * 44.0 / 12.0));
    }

    #[test]
    fn test_key_attribute() {
        let formula = ActivityFactor::from_parameters(ActivityFactorParameters {
            key_attribute: Some("material".to_string()),
            ..ActivityFactorParameters::process("prebaked_anode", 1.6, "tCO2/t")
        });
        assert_eq!(
            formula.spec().factors[0].key,
            KeySource::Attribute {
                name: "material".to_string(),
                fallback: Some("prebaked_anode".to_string())
            }
        );
    }
}
