//! Carbon mass balance
//!
//! Process CO2 of steelmaking and petrochemical units, computed from the carbon that
//! enters with the raw materials minus the carbon that leaves in products and wastes.

use ghg_core::formula::{Formula, FormulaSpec, InputState, OutputState};
use ghg_core::standard_factors::CO2_PER_CARBON;
use ghg_core::standard_indicators::{
    IND_EMISSION, IND_INPUT_AMOUNT, IND_INPUT_CARBON, IND_OUTPUT_AMOUNT, IND_OUTPUT_CARBON,
};
use ghg_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Carbon balance of one process unit
///
/// $$ E = \max(0, M_{in} \cdot C_{in} - M_{out} \cdot C_{out}) \cdot \frac{44}{12} $$
///
/// Carbon contents are mass fractions (tC/t).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarbonBalance {}

impl CarbonBalance {
    pub fn new() -> Self {
        Self {}
    }

    pub fn calculate_emission(
        &self,
        input_amount: FloatValue,
        input_carbon: FloatValue,
        output_amount: FloatValue,
        output_carbon: FloatValue,
    ) -> FloatValue {
        (input_amount * input_carbon - output_amount * output_carbon).max(0.0) * CO2_PER_CARBON
    }
}

#[typetag::serde]
impl Formula for CarbonBalance {
    fn spec(&self) -> FormulaSpec {
        FormulaSpec::new()
            .input(IND_INPUT_AMOUNT.key)
            .input(IND_INPUT_CARBON.key)
            .input(IND_OUTPUT_AMOUNT.key)
            .input(IND_OUTPUT_CARBON.key)
            .output(IND_EMISSION.key)
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        let emission = self.calculate_emission(
            inputs.get(IND_INPUT_AMOUNT.key),
            inputs.get(IND_INPUT_CARBON.key),
            inputs.get(IND_OUTPUT_AMOUNT.key),
            inputs.get(IND_OUTPUT_CARBON.key),
        );
        OutputState::from([(IND_EMISSION.key.to_string(), emission)])
    }
}
