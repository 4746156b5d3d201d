//! Recovered gas
//!
//! CO2 captured for use and CH4 recovered for utilisation. Entities of these categories
//! are deduction legs: their emission is subtracted from the industry's sources.

use ghg_core::factors::FactorRequirement;
use ghg_core::formula::{Formula, FormulaSpec, InputState, OutputState};
use ghg_core::standard_factors::categories::{GAS_DENSITY, GWP};
use ghg_core::standard_indicators::{
    IND_EMISSION, IND_GAS_MASS, IND_GWP, IND_PURITY, IND_RECOVERED_VOLUME,
};
use ghg_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

const DENSITY: &str = "density";
const GWP_FACTOR: &str = "gwp";

pub const GAS_ATTRIBUTE: &str = "gas";

/// Parameters for gas recovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasRecoveryParameters {
    /// Registry key used when the entity does not name its gas
    pub gas: String,
    /// unit: t / 10^4 Nm^3
    pub default_density: FloatValue,
    pub default_gwp: FloatValue,
}

impl Default for GasRecoveryParameters {
    fn default() -> Self {
        Self {
            gas: "CO2".to_string(),
            default_density: 19.77,
            default_gwp: 1.0,
        }
    }
}

impl GasRecoveryParameters {
    pub fn methane() -> Self {
        Self {
            gas: "CH4".to_string(),
            default_density: 7.17,
            default_gwp: 21.0,
        }
    }
}

/// Mass of gas recovered, in CO2e
///
/// $$ E = V \cdot \frac{p}{100} \cdot \rho \cdot GWP $$
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasRecovery {
    #[serde(flatten)]
    parameters: GasRecoveryParameters,
}

impl GasRecovery {
    pub fn from_parameters(parameters: GasRecoveryParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate_gas_mass(
        &self,
        volume: FloatValue,
        purity: FloatValue,
        density: FloatValue,
    ) -> FloatValue {
        (volume * purity / 100.0 * density).max(0.0)
    }
}

#[typetag::serde]
impl Formula for GasRecovery {
    fn spec(&self) -> FormulaSpec {
        let p = &self.parameters;
        FormulaSpec::new()
            .input(IND_RECOVERED_VOLUME.key)
            .input(IND_PURITY.key)
            .factor(
                FactorRequirement::by_attribute(
                    DENSITY,
                    GAS_DENSITY,
                    GAS_ATTRIBUTE,
                    p.default_density,
                    "t/10^4Nm^3",
                )
                .with_fallback_key(p.gas.clone()),
            )
            .factor(
                FactorRequirement::by_attribute(GWP_FACTOR, GWP, GAS_ATTRIBUTE, p.default_gwp, "tCO2e/t")
                    .with_fallback_key(p.gas.clone())
                    .with_override(IND_GWP.key),
            )
            .output(IND_GAS_MASS.key)
            .output(IND_EMISSION.key)
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        let gas_mass = self.calculate_gas_mass(
            inputs.get(IND_RECOVERED_VOLUME.key),
            inputs.get(IND_PURITY.key),
            inputs.factor(DENSITY),
        );
        OutputState::from([
            (IND_GAS_MASS.key.to_string(), gas_mass),
            (IND_EMISSION.key.to_string(), gas_mass * inputs.factor(GWP_FACTOR)),
        ])
    }
}
