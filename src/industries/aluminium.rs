//! Primary aluminium smelting

use super::{carbonate, fuel_combustion, with_purchased_energy};
use ghg_components::components::{AnodeEffectPfc, ActivityFactor, ActivityFactorParameters};
use ghg_core::aggregate::AggregateRole;
use ghg_core::config::{CategoryConfig, IndustryConfig};

pub const KEY: &str = "aluminium";

pub fn preset() -> IndustryConfig {
    let anode = CategoryConfig::new("anode_consumption", "Anode consumption", AggregateRole::Additive)
        .with_formula(ActivityFactor::from_parameters(ActivityFactorParameters {
            key_attribute: Some("anode_type".to_string()),
            ..ActivityFactorParameters::process("prebaked_anode", 1.6, "tCO2/tAl")
        }));
    let pfc = CategoryConfig::new("anode_effect", "PFC from anode effects", AggregateRole::Additive)
        .with_formula(AnodeEffectPfc::from_parameters(Default::default()));

    with_purchased_energy(
        IndustryConfig::new(KEY, "Aluminium")
            .with_category(fuel_combustion())
            .with_category(anode)
            .with_category(pfc)
            .with_category(carbonate()),
    )
}
