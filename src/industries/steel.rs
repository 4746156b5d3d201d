//! Iron and steel
//!
//! Carbon that ends up in crude steel and by-products is not emitted; it is recorded as a
//! deduction from the sources.

use super::{carbonate, fuel_combustion, with_purchased_energy};
use ghg_components::components::{ActivityFactor, ActivityFactorParameters, CarbonBalance};
use ghg_core::aggregate::AggregateRole;
use ghg_core::config::{CategoryConfig, IndustryConfig};

pub const KEY: &str = "steel";
pub const CARBON_FIXED: &str = "carbon_fixed";

pub fn preset() -> IndustryConfig {
    let electrode = CategoryConfig::new("electrode", "Electrode consumption", AggregateRole::Additive)
        .with_formula(ActivityFactor::from_parameters(ActivityFactorParameters::process(
            "electrode",
            3.663,
            "tCO2/t",
        )));
    let process = CategoryConfig::new("process", "Ironmaking and steelmaking", AggregateRole::Additive)
        .with_formula(CarbonBalance::new());
    let carbon_fixed = CategoryConfig::new(CARBON_FIXED, "Carbon fixed in products", AggregateRole::Deduction)
        .with_formula(ActivityFactor::from_parameters(ActivityFactorParameters {
            carbon_basis: true,
            ..ActivityFactorParameters::process("crude_steel_carbon", 0.0154, "tC/t")
        }));

    with_purchased_energy(
        IndustryConfig::new(KEY, "Iron and steel")
            .with_category(fuel_combustion())
            .with_category(carbonate())
            .with_category(electrode)
            .with_category(process)
            .with_category(carbon_fixed),
    )
}
