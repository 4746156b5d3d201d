//! Purchased electricity and heat
//!
//! Indirect emissions from energy bought from outside the reporting boundary. Energy
//! supplied onward to other parties is netted off before the grid or heat factor is
//! applied.

use ghg_core::config::REGION_ATTRIBUTE;
use ghg_core::factors::FactorRequirement;
use ghg_core::formula::{Formula, FormulaSpec, InputState, OutputState};
use ghg_core::standard_factors::categories::{ELECTRICITY, HEAT};
use ghg_core::standard_indicators::{
    IND_EMISSION, IND_EMISSION_FACTOR, IND_EXTERNAL_SUPPLY, IND_NET_AMOUNT, IND_PURCHASED,
};
use ghg_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

const FACTOR: &str = "factor";

/// Entity attribute naming the heat medium ("steam" or "hot_water")
pub const HEAT_TYPE_ATTRIBUTE: &str = "heat_type";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyCarrier {
    #[default]
    Electricity,
    Heat,
}

/// Parameters for the net purchase formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetPurchaseParameters {
    pub carrier: EnergyCarrier,
    /// Factor used when neither an override nor a registry entry applies
    /// unit: tCO2/kWh (electricity) or tCO2/GJ (heat)
    pub default_factor: FloatValue,
}

impl Default for NetPurchaseParameters {
    fn default() -> Self {
        Self {
            carrier: EnergyCarrier::Electricity,
            default_factor: 0.0005703,
        }
    }
}

impl NetPurchaseParameters {
    /// Heat with the national default of 0.11 tCO2/GJ.
    pub fn heat() -> Self {
        Self {
            carrier: EnergyCarrier::Heat,
            default_factor: 0.11,
        }
    }
}

/// Emissions of purchased energy
///
/// $$ E = \max(0, P - S) \cdot EF $$
///
/// Where:
/// - $P$ is the purchased amount
/// - $S$ is the amount supplied to external parties
/// - $EF$ is the regional grid factor for the reporting year, or the heat factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetPurchase {
    #[serde(flatten)]
    parameters: NetPurchaseParameters,
}

impl NetPurchase {
    pub fn from_parameters(parameters: NetPurchaseParameters) -> Self {
        Self { parameters }
    }

    pub fn electricity() -> Self {
        Self::from_parameters(NetPurchaseParameters::default())
    }

    pub fn heat() -> Self {
        Self::from_parameters(NetPurchaseParameters::heat())
    }

    /// Net amount, never negative
    pub fn calculate_net_amount(&self, purchased: FloatValue, supplied: FloatValue) -> FloatValue {
        (purchased - supplied).max(0.0)
    }

    pub fn calculate_emission(&self, net_amount: FloatValue, factor: FloatValue) -> FloatValue {
        net_amount * factor
    }

    fn factor_requirement(&self) -> FactorRequirement {
        let requirement = match self.parameters.carrier {
            EnergyCarrier::Electricity => FactorRequirement::by_attribute(
                FACTOR,
                ELECTRICITY,
                REGION_ATTRIBUTE,
                self.parameters.default_factor,
                "tCO2/kWh",
            )
            .year_sensitive(),
            EnergyCarrier::Heat => FactorRequirement::by_attribute(
                FACTOR,
                HEAT,
                HEAT_TYPE_ATTRIBUTE,
                self.parameters.default_factor,
                "tCO2/GJ",
            ),
        };
        requirement.with_override(IND_EMISSION_FACTOR.key)
    }
}

#[typetag::serde]
impl Formula for NetPurchase {
    fn spec(&self) -> FormulaSpec {
        FormulaSpec::new()
            .input(IND_PURCHASED.key)
            .input(IND_EXTERNAL_SUPPLY.key)
            .factor(self.factor_requirement())
            .output(IND_NET_AMOUNT.key)
            .output(IND_EMISSION.key)
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        let net_amount = self.calculate_net_amount(
            inputs.get(IND_PURCHASED.key),
            inputs.get(IND_EXTERNAL_SUPPLY.key),
        );
        let emission = self.calculate_emission(net_amount, inputs.factor(FACTOR));

        OutputState::from([
            (IND_NET_AMOUNT.key.to_string(), net_amount),
            (IND_EMISSION.key.to_string(), emission),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_north_china_grid() {
        let formula = NetPurchase::electricity();
        let inputs = InputState::new()
            .with_value(IND_PURCHASED.key, 1000.0)
            .with_value(IND_EXTERNAL_SUPPLY.key, 200.0)
            .with_factor(FACTOR, 0.0006776);

        let outputs = formula.evaluate(&inputs);
        assert_eq!(outputs[IND_NET_AMOUNT.key], 800.0);
        assert_relative_eq!(outputs[IND_EMISSION.key], 0.54208, epsilon = 1e-12);
    }

    #[test]
    fn test_supply_exceeding_purchase_is_zero() {
        let formula = NetPurchase::electricity();
        for (purchased, supplied) in [(0.0, 0.0), (100.0, 100.0), (50.0, 80.0), (0.0, 1e9)] {
            let net = formula.calculate_net_amount(purchased, supplied);
            assert_eq!(net, 0.0);
            assert_eq!(formula.calculate_emission(net, 0.0006776), 0.0);
        }
    }

    #[test]
    fn test_missing_inputs_are_zero() {
        let outputs = NetPurchase::heat().evaluate(&InputState::new());
        assert_eq!(outputs[IND_EMISSION.key], 0.0);
    }

    #[test]
    fn test_factor_requirements() {
        let electricity = NetPurchase::electricity().spec();
        assert_eq!(electricity.factors[0].category, ELECTRICITY);
        assert!(electricity.factors[0].year_sensitive);
        assert_eq!(
            electricity.factors[0].override_indicator.as_deref(),
            Some(IND_EMISSION_FACTOR.key)
        );

        let heat = NetPurchase::heat().spec();
        assert_eq!(heat.factors[0].category, HEAT);
        assert_eq!(heat.factors[0].default, 0.11);
        assert!(!heat.factors[0].year_sensitive);
    }
}
