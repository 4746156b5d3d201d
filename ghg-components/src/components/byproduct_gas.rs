//! By-product gas from fluorochemical production
//!
//! HCFC-22 production lines generate HFC-23 as a by-product. Part of it is recovered
//! and part is thermally destroyed; the remainder escapes. Destruction converts the
//! HFC-23 into CO2, which is counted at the molecular weight ratio.
//!
//! The calculation is split into two formulas that run as a chain: generation sums
//! the lines, disposal consumes the generated mass.

use ghg_core::factors::FactorRequirement;
use ghg_core::formula::{Formula, FormulaSpec, InputState, OutputState};
use ghg_core::standard_factors::categories::{BYPRODUCT_GENERATION, GWP};
use ghg_core::standard_factors::CO2_PER_HFC23;
use ghg_core::standard_indicators::{
    IND_DESTROYED, IND_DESTROYED_INPUT, IND_DESTROYED_OUTPUT, IND_EMISSION, IND_EMISSION_FACTOR,
    IND_GENERATED, IND_GWP, IND_NET_EMISSION, IND_PRODUCTION, IND_RECOVERY,
};
use ghg_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

const GWP_FACTOR: &str = "gwp";

/// Entity attribute naming the main product of the lines
pub const PRODUCT_ATTRIBUTE: &str = "product";
/// Entity attribute naming the by-product gas
pub const GAS_ATTRIBUTE: &str = "gas";

/// Parameters for by-product generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ByproductGenerationParameters {
    /// Production lines. Each line gets its own `production|<line>` input and
    /// `emission_factor|<line>` override; without lines a single `production` input is used.
    pub lines: Vec<String>,
    /// Registry key used when the entity does not name its product
    pub product: String,
    /// unit: t by-product / t product
    pub default_factor: FloatValue,
}

impl Default for ByproductGenerationParameters {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            product: "HCFC-22".to_string(),
            default_factor: 0.0292,
        }
    }
}

/// By-product gas generated by one or more production lines
///
/// $$ G = \sum_i P_i \cdot EF_i $$
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByproductGeneration {
    #[serde(flatten)]
    parameters: ByproductGenerationParameters,
}

impl ByproductGeneration {
    pub fn from_parameters(parameters: ByproductGenerationParameters) -> Self {
        Self { parameters }
    }

    /// (production input, factor name, override indicator) of every line
    fn line_keys(&self) -> Vec<(String, String, String)> {
        if self.parameters.lines.is_empty() {
            return vec![(
                IND_PRODUCTION.key.to_string(),
                "generation".to_string(),
                IND_EMISSION_FACTOR.key.to_string(),
            )];
        }
        self.parameters
            .lines
            .iter()
            .map(|line| {
                (
                    format!("{}|{}", IND_PRODUCTION.key, line),
                    format!("generation|{}", line),
                    format!("{}|{}", IND_EMISSION_FACTOR.key, line),
                )
            })
            .collect()
    }

    pub fn calculate_generated(&self, lines: &[(FloatValue, FloatValue)]) -> FloatValue {
        lines
            .iter()
            .map(|(production, factor)| production * factor)
            .sum()
    }
}

#[typetag::serde]
impl Formula for ByproductGeneration {
    fn spec(&self) -> FormulaSpec {
        let mut spec = FormulaSpec::new();
        for (input, factor, override_indicator) in self.line_keys() {
            spec = spec.input(input).factor(
                FactorRequirement::by_attribute(
                    factor,
                    BYPRODUCT_GENERATION,
                    PRODUCT_ATTRIBUTE,
                    self.parameters.default_factor,
                    "t/t",
                )
                .with_fallback_key(self.parameters.product.clone())
                .with_override(override_indicator),
            );
        }
        spec.output(IND_GENERATED.key)
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        let lines: Vec<(FloatValue, FloatValue)> = self
            .line_keys()
            .iter()
            .map(|(input, factor, _)| (inputs.get(input), inputs.factor(factor)))
            .collect();

        OutputState::from([(IND_GENERATED.key.to_string(), self.calculate_generated(&lines))])
    }
}

/// Parameters for by-product disposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ByproductDisposalParameters {
    /// Registry key used when the entity does not name its gas
    pub gas: String,
    pub default_gwp: FloatValue,
    /// CO2 formed per tonne of gas destroyed
    /// unit: tCO2/t
    pub co2_per_destroyed: FloatValue,
}

impl Default for ByproductDisposalParameters {
    fn default() -> Self {
        Self {
            gas: "HFC-23".to_string(),
            default_gwp: 11700.0,
            co2_per_destroyed: CO2_PER_HFC23,
        }
    }
}

/// Emissions of the generated by-product after recovery and destruction
///
/// $$ D = \max(0, D_{in} - D_{out}) $$
/// $$ N = \max(0, G - R - D) $$
/// $$ E = N \cdot GWP + D \cdot \frac{44}{70} $$
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByproductDisposal {
    #[serde(flatten)]
    parameters: ByproductDisposalParameters,
}

impl ByproductDisposal {
    pub fn from_parameters(parameters: ByproductDisposalParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate_destroyed(&self, input: FloatValue, output: FloatValue) -> FloatValue {
        (input - output).max(0.0)
    }

    pub fn calculate_net_emission(
        &self,
        generated: FloatValue,
        recovery: FloatValue,
        destroyed: FloatValue,
    ) -> FloatValue {
        (generated - recovery - destroyed).max(0.0)
    }

    pub fn calculate_emission(
        &self,
        net_emission: FloatValue,
        destroyed: FloatValue,
        gwp: FloatValue,
    ) -> FloatValue {
        net_emission * gwp + destroyed * self.parameters.co2_per_destroyed
    }
}

#[typetag::serde]
impl Formula for ByproductDisposal {
    fn spec(&self) -> FormulaSpec {
        FormulaSpec::new()
            .input(IND_GENERATED.key)
            .input(IND_RECOVERY.key)
            .input(IND_DESTROYED_INPUT.key)
            .input(IND_DESTROYED_OUTPUT.key)
            .factor(
                FactorRequirement::by_attribute(
                    GWP_FACTOR,
                    GWP,
                    GAS_ATTRIBUTE,
                    self.parameters.default_gwp,
                    "tCO2e/t",
                )
                .with_fallback_key(self.parameters.gas.clone())
                .with_override(IND_GWP.key),
            )
            .output(IND_DESTROYED.key)
            .output(IND_NET_EMISSION.key)
            .output(IND_EMISSION.key)
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        let destroyed = self.calculate_destroyed(
            inputs.get(IND_DESTROYED_INPUT.key),
            inputs.get(IND_DESTROYED_OUTPUT.key),
        );
        let net_emission = self.calculate_net_emission(
            inputs.get(IND_GENERATED.key),
            inputs.get(IND_RECOVERY.key),
            destroyed,
        );
        let emission = self.calculate_emission(net_emission, destroyed, inputs.factor(GWP_FACTOR));

        OutputState::from([
            (IND_DESTROYED.key.to_string(), destroyed),
            (IND_NET_EMISSION.key.to_string(), net_emission),
            (IND_EMISSION.key.to_string(), emission),
        ])
    }
}
