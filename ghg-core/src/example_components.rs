#![allow(dead_code)]

use crate::factors::FactorRequirement;
use crate::formula::{Formula, FormulaSpec, InputState, OutputState};
use crate::standard_factors::categories::PROCESS;
use crate::standard_indicators::{IND_ACTIVITY, IND_EMISSION, IND_EMISSION_FACTOR};
use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Doubles the `activity` indicator into `doubled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DoubleActivity;

#[typetag::serde]
impl Formula for DoubleActivity {
    fn spec(&self) -> FormulaSpec {
        FormulaSpec::new().input(IND_ACTIVITY.key).output("doubled")
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        OutputState::from([("doubled".to_string(), inputs.get(IND_ACTIVITY.key) * 2.0)])
    }
}

/// `emission = input × factor`, where the factor defaults to 1 and may be overridden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ScaledActivity {
    pub input: String,
}

impl ScaledActivity {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }

    pub fn calculate_emission(&self, input: FloatValue, factor: FloatValue) -> FloatValue {
        input * factor
    }
}

#[typetag::serde]
impl Formula for ScaledActivity {
    fn spec(&self) -> FormulaSpec {
        FormulaSpec::new()
            .input(self.input.clone())
            .factor(
                FactorRequirement::fixed("factor", PROCESS, "test_scale", 1.0, "")
                    .with_override(IND_EMISSION_FACTOR.key),
            )
            .output(IND_EMISSION.key)
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        let emission = self.calculate_emission(inputs.get(&self.input), inputs.factor("factor"));
        OutputState::from([(IND_EMISSION.key.to_string(), emission)])
    }
}
