//! Perfluorocarbons from aluminium anode effects

use ghg_core::factors::FactorRequirement;
use ghg_core::formula::{Formula, FormulaSpec, InputState, OutputState};
use ghg_core::standard_factors::categories::{ANODE_EFFECT, GWP};
use ghg_core::standard_indicators::{IND_EMISSION, IND_PRODUCTION};
use ghg_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

const EF_CF4: &str = "ef_cf4";
const EF_C2F6: &str = "ef_c2f6";
const GWP_CF4: &str = "gwp_cf4";
const GWP_C2F6: &str = "gwp_c2f6";

/// Parameters for anode effect PFC emissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnodeEffectPfcParameters {
    /// unit: kg CF4 / t Al
    pub default_ef_cf4: FloatValue,
    /// unit: kg C2F6 / t Al
    pub default_ef_c2f6: FloatValue,
    pub default_gwp_cf4: FloatValue,
    pub default_gwp_c2f6: FloatValue,
}

impl Default for AnodeEffectPfcParameters {
    fn default() -> Self {
        Self {
            default_ef_cf4: 0.034,
            default_ef_c2f6: 0.0034,
            default_gwp_cf4: 6500.0,
            default_gwp_c2f6: 9200.0,
        }
    }
}

/// CF4 and C2F6 from anode effects
///
/// $$ E = P \cdot (EF_{CF4} \cdot GWP_{CF4} + EF_{C2F6} \cdot GWP_{C2F6}) / 1000 $$
///
/// Where $P$ is primary aluminium production (t) and the factors are in kg per tonne.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnodeEffectPfc {
    #[serde(flatten)]
    parameters: AnodeEffectPfcParameters,
}

impl AnodeEffectPfc {
    pub fn from_parameters(parameters: AnodeEffectPfcParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate_emission(
        &self,
        production: FloatValue,
        ef_cf4: FloatValue,
        gwp_cf4: FloatValue,
        ef_c2f6: FloatValue,
        gwp_c2f6: FloatValue,
    ) -> FloatValue {
        (production * (ef_cf4 * gwp_cf4 + ef_c2f6 * gwp_c2f6) / 1000.0).max(0.0)
    }
}

#[typetag::serde]
impl Formula for AnodeEffectPfc {
    fn spec(&self) -> FormulaSpec {
        let p = &self.parameters;
        FormulaSpec::new()
            .input(IND_PRODUCTION.key)
            .factor(FactorRequirement::fixed(EF_CF4, ANODE_EFFECT, "CF4", p.default_ef_cf4, "kg/t"))
            .factor(FactorRequirement::fixed(EF_C2F6, ANODE_EFFECT, "C2F6", p.default_ef_c2f6, "kg/t"))
            .factor(FactorRequirement::fixed(GWP_CF4, GWP, "CF4", p.default_gwp_cf4, "tCO2e/t"))
            .factor(FactorRequirement::fixed(GWP_C2F6, GWP, "C2F6", p.default_gwp_c2f6, "tCO2e/t"))
            .output(IND_EMISSION.key)
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        let emission = self.calculate_emission(
            inputs.get(IND_PRODUCTION.key),
            inputs.factor(EF_CF4),
            inputs.factor(GWP_CF4),
            inputs.factor(EF_C2F6),
            inputs.factor(GWP_C2F6),
        );
        OutputState::from([(IND_EMISSION.key.to_string(), emission)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_factors() {
        let formula = AnodeEffectPfc::from_parameters(Default::default());
        let emission = formula.calculate_emission(10_000.0, 0.034, 6500.0, 0.0034, 9200.0);
        // 10 kt Al: (221 + 31.28) kg CO2e/t
        assert_relative_eq!(emission, 2522.8, epsilon = 1e-9);
    }

    #[test]
    fn test_spec_has_four_factors() {
        let spec = AnodeEffectPfc::from_parameters(Default::default()).spec();
        assert_eq!(spec.factors.len(), 4);
        assert!(spec.factors.iter().all(|f| f.override_indicator.is_none()));
    }
}
