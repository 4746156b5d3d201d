//! Carbonate decomposition
//!
//! Process CO2 released when limestone, dolomite and other carbonates are calcined.

use ghg_core::factors::FactorRequirement;
use ghg_core::formula::{Formula, FormulaSpec, InputState, OutputState};
use ghg_core::standard_factors::categories::CARBONATE;
use ghg_core::standard_indicators::{IND_CONSUMPTION, IND_EMISSION, IND_EMISSION_FACTOR, IND_PURITY};
use ghg_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

const FACTOR: &str = "factor";

/// Entity attribute naming the carbonate, e.g. "CaCO3"
pub const MATERIAL_ATTRIBUTE: &str = "material";

/// Parameters for carbonate decomposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonateDecompositionParameters {
    /// Registry key used when the entity does not name its material
    pub material: String,
    /// unit: tCO2/t
    pub default_factor: FloatValue,
}

impl Default for CarbonateDecompositionParameters {
    fn default() -> Self {
        Self {
            material: "CaCO3".to_string(),
            default_factor: 0.440,
        }
    }
}

/// CO2 from carbonate decomposition
///
/// $$ E = \max(0, C \cdot EF \cdot \frac{p}{100}) $$
///
/// Where:
/// - $C$ is the carbonate consumed (t)
/// - $EF$ is the material's emission factor (tCO2/t)
/// - $p$ is the purity in percent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonateDecomposition {
    #[serde(flatten)]
    parameters: CarbonateDecompositionParameters,
}

impl CarbonateDecomposition {
    pub fn from_parameters(parameters: CarbonateDecompositionParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate_emission(
        &self,
        consumption: FloatValue,
        factor: FloatValue,
        purity: FloatValue,
    ) -> FloatValue {
        (consumption * factor * purity / 100.0).max(0.0)
    }
}

#[typetag::serde]
impl Formula for CarbonateDecomposition {
    fn spec(&self) -> FormulaSpec {
        FormulaSpec::new()
            .input(IND_CONSUMPTION.key)
            .input(IND_PURITY.key)
            .factor(
                FactorRequirement::by_attribute(
                    FACTOR,
                    CARBONATE,
                    MATERIAL_ATTRIBUTE,
                    self.parameters.default_factor,
                    "tCO2/t",
                )
                .with_fallback_key(self.parameters.material.clone())
                .with_override(IND_EMISSION_FACTOR.key),
            )
            .output(IND_EMISSION.key)
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        let emission = self.calculate_emission(
            inputs.get(IND_CONSUMPTION.key),
            inputs.factor(FACTOR),
            inputs.get(IND_PURITY.key),
        );
        OutputState::from([(IND_EMISSION.key.to_string(), emission)])
    }
}
