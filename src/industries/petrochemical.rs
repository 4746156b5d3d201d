//! Petrochemical production

use super::{co2_recovery, flaring, fuel_combustion, with_purchased_energy};
use ghg_components::components::CarbonBalance;
use ghg_core::aggregate::AggregateRole;
use ghg_core::config::{CategoryConfig, IndustryConfig};

pub const KEY: &str = "petrochemical";

pub fn preset() -> IndustryConfig {
    let process = CategoryConfig::new("process", "Process emissions (carbon balance)", AggregateRole::Additive)
        .with_formula(CarbonBalance::new());

    with_purchased_energy(
        IndustryConfig::new(KEY, "Petrochemical")
            .with_category(fuel_combustion())
            .with_category(flaring())
            .with_category(process)
            .with_category(co2_recovery()),
    )
}
