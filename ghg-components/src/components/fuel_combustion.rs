//! Fossil fuel combustion
//!
//! CO2 from burning fuels, computed from the fuel's net calorific value, carbon content
//! per unit heat and oxidation rate. All three are looked up by the entity's `fuel`
//! attribute and each may be replaced by measured monthly values.

use ghg_core::factors::FactorRequirement;
use ghg_core::formula::{Formula, FormulaSpec, InputState, OutputState};
use ghg_core::standard_factors::categories::{FUEL_CARBON_CONTENT, FUEL_NCV, FUEL_OXIDATION};
use ghg_core::standard_factors::CO2_PER_CARBON;
use ghg_core::standard_indicators::{
    IND_CARBON_CONTENT, IND_CONSUMPTION, IND_EMISSION, IND_NCV, IND_OXIDATION_RATE,
};
use ghg_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

const NCV: &str = "ncv";
const CARBON_CONTENT: &str = "carbon_content";
const OXIDATION: &str = "oxidation";

pub const FUEL_ATTRIBUTE: &str = "fuel";

/// Parameters for fuel combustion
///
/// The defaults are those of raw coal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelCombustionParameters {
    /// Registry key used when the entity does not name its fuel
    pub fuel: String,
    /// unit: GJ/t
    pub default_ncv: FloatValue,
    /// unit: tC/GJ
    pub default_carbon_content: FloatValue,
    pub default_oxidation: FloatValue,
}

impl Default for FuelCombustionParameters {
    fn default() -> Self {
        Self {
            fuel: "raw_coal".to_string(),
            default_ncv: 20.908,
            default_carbon_content: 0.02618,
            default_oxidation: 0.94,
        }
    }
}

/// CO2 from fuel combustion
///
/// $$ E = FC \cdot NCV \cdot CC \cdot OF \cdot \frac{44}{12} $$
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelCombustion {
    #[serde(flatten)]
    parameters: FuelCombustionParameters,
}

impl FuelCombustion {
    pub fn from_parameters(parameters: FuelCombustionParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate_emission(
        &self,
        consumption: FloatValue,
        ncv: FloatValue,
        carbon_content: FloatValue,
        oxidation: FloatValue,
    ) -> FloatValue {
        (consumption * ncv * carbon_content * oxidation * CO2_PER_CARBON).max(0.0)
    }

    fn requirement(
        &self,
        name: &str,
        category: &str,
        default: FloatValue,
        unit: &str,
        override_indicator: &str,
    ) -> FactorRequirement {
        FactorRequirement::by_attribute(name, category, FUEL_ATTRIBUTE, default, unit)
            .with_fallback_key(self.parameters.fuel.clone())
            .with_override(override_indicator)
    }
}

#[typetag::serde]
impl Formula for FuelCombustion {
    fn spec(&self) -> FormulaSpec {
        FormulaSpec::new()
            .input(IND_CONSUMPTION.key)
            .factor(self.requirement(
                NCV,
                FUEL_NCV,
                self.parameters.default_ncv,
                "GJ/t",
                IND_NCV.key,
            ))
            .factor(self.requirement(
                CARBON_CONTENT,
                FUEL_CARBON_CONTENT,
                self.parameters.default_carbon_content,
                "tC/GJ",
                IND_CARBON_CONTENT.key,
            ))
            .factor(self.requirement(
                OXIDATION,
                FUEL_OXIDATION,
                self.parameters.default_oxidation,
                "",
                IND_OXIDATION_RATE.key,
            ))
            .output(IND_EMISSION.key)
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        let emission = self.calculate_emission(
            inputs.get(IND_CONSUMPTION.key),
            inputs.factor(NCV),
            inputs.factor(CARBON_CONTENT),
            inputs.factor(OXIDATION),
        );
        OutputState::from([(IND_EMISSION.key.to_string(), emission)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_raw_coal() {
        let formula = FuelCombustion::from_parameters(Default::default());
        // 100 t raw coal
        let emission = formula.calculate_emission(100.0, 20.908, 0.02618, 0.94);
        assert_relative_eq!(emission, 188.6607, epsilon = 1e-3);
    }

    #[test]
    fn test_every_factor_can_be_overridden() {
        let spec = FuelCombustion::from_parameters(Default::default()).spec();
        let overrides: Vec<Option<&str>> = spec
            .factors
            .iter()
            .map(|f| f.override_indicator.as_deref())
            .collect();
        assert_eq!(
            overrides,
            vec![
                Some(IND_NCV.key),
                Some(IND_CARBON_CONTENT.key),
                Some(IND_OXIDATION_RATE.key)
            ]
        );
    }

    #[test]
    fn test_evaluate_reads_resolved_factors() {
        let formula = FuelCombustion::from_parameters(Default::default());
        let inputs = InputState::new()
            .with_value(IND_CONSUMPTION.key, 10.0)
            .with_factor(NCV, 389.31)
            .with_factor(CARBON_CONTENT, 0.01532)
            .with_factor(OXIDATION, 0.99);
        let expected = 10.0 * 389.31 * 0.01532 * 0.99 * 44.0 / 12.0;
        assert_relative_eq!(formula.evaluate(&inputs)[IND_EMISSION.key], expected, epsilon = 1e-9);
    }
}
