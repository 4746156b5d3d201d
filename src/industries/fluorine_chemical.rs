//! Fluorine chemical production
//!
//! HCFC-22 plants emit HFC-23 as a by-product. Generation is estimated line by line;
//! what is neither recovered nor destroyed is emitted, and destruction itself forms CO2.

use super::{carbonate, co2_recovery, fuel_combustion, with_purchased_energy};
use ghg_components::components::{ByproductDisposal, ByproductGeneration};
use ghg_core::aggregate::AggregateRole;
use ghg_core::config::{CategoryConfig, IndustryConfig};

pub const KEY: &str = "fluorine_chemical";
pub const HFC23_BYPRODUCT: &str = "hfc23_byproduct";

pub fn preset() -> IndustryConfig {
    let byproduct = CategoryConfig::new(
        HFC23_BYPRODUCT,
        "HFC-23 from HCFC-22 production",
        AggregateRole::Additive,
    )
    .with_formula(ByproductGeneration::from_parameters(Default::default()))
    .with_formula(ByproductDisposal::from_parameters(Default::default()));

    with_purchased_energy(
        IndustryConfig::new(KEY, "Fluorine chemical")
            .with_category(fuel_combustion())
            .with_category(carbonate())
            .with_category(byproduct)
            .with_category(co2_recovery()),
    )
}
