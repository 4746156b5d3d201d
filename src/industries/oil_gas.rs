//! Oil and gas production, processing and transmission

use super::{ch4_recovery, co2_recovery, flaring, fuel_combustion, with_purchased_energy};
use ghg_components::components::FugitiveEmission;
use ghg_core::aggregate::AggregateRole;
use ghg_core::config::{CategoryConfig, IndustryConfig};

pub const KEY: &str = "oil_gas";
pub const FUGITIVE: &str = "fugitive";

pub fn preset() -> IndustryConfig {
    let fugitive = CategoryConfig::new(FUGITIVE, "Fugitive and vented CH4", AggregateRole::Additive)
        .with_formula(FugitiveEmission::from_parameters(Default::default()));

    with_purchased_energy(
        IndustryConfig::new(KEY, "Oil and gas")
            .with_category(fuel_combustion())
            .with_category(flaring())
            .with_category(fugitive)
            .with_category(ch4_recovery())
            .with_category(co2_recovery()),
    )
}
