//! Ready-made industry configurations
//!
//! Each sector covered by the accounting guidelines gets a preset listing its emission
//! categories, the formulas of each category and how the category enters the industry
//! total. Every preset ends with the purchased electricity and heat categories, each with
//! one non-removable entity.

mod aluminium;
mod fluorine_chemical;
mod oil_gas;
mod petrochemical;
mod steel;

use ghg_components::components::{
    ActivityFactor, ActivityFactorParameters, CarbonateDecomposition, FuelCombustion,
    GasRecovery, GasRecoveryParameters, NetPurchase,
};
use ghg_core::aggregate::AggregateRole;
use ghg_core::config::{CategoryConfig, IndustryConfig};
use ghg_core::entity::EntitySeed;
use ghg_core::errors::GhgError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ELECTRICITY: &str = "electricity";
pub const HEAT: &str = "heat";
pub const FUEL_COMBUSTION: &str = "fuel_combustion";
pub const CARBONATE: &str = "carbonate";
pub const CO2_RECOVERY: &str = "co2_recovery";
pub const FLARING: &str = "flaring";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustryKind {
    FluorineChemical,
    Aluminium,
    OilGas,
    Petrochemical,
    Steel,
}

impl IndustryKind {
    pub const ALL: [IndustryKind; 5] = [
        IndustryKind::FluorineChemical,
        IndustryKind::Aluminium,
        IndustryKind::OilGas,
        IndustryKind::Petrochemical,
        IndustryKind::Steel,
    ];

    pub fn key(self) -> &'static str {
        match self {
            IndustryKind::FluorineChemical => "fluorine_chemical",
            IndustryKind::Aluminium => "aluminium",
            IndustryKind::OilGas => "oil_gas",
            IndustryKind::Petrochemical => "petrochemical",
            IndustryKind::Steel => "steel",
        }
    }

    pub fn preset(self) -> IndustryConfig {
        match self {
            IndustryKind::FluorineChemical => fluorine_chemical::preset(),
            IndustryKind::Aluminium => aluminium::preset(),
            IndustryKind::OilGas => oil_gas::preset(),
            IndustryKind::Petrochemical => petrochemical::preset(),
            IndustryKind::Steel => steel::preset(),
        }
    }
}

impl fmt::Display for IndustryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for IndustryKind {
    type Err = GhgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndustryKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s.trim())
            .ok_or_else(|| GhgError::UnknownIndustry(s.to_string()))
    }
}

/// Entity ids are unique across a ledger, so seeded ids carry the industry key.
fn seed_id(industry: &str, name: &str) -> String {
    format!("{}.{}", industry, name)
}

fn fuel_combustion() -> CategoryConfig {
    CategoryConfig::new(FUEL_COMBUSTION, "Fossil fuel combustion", AggregateRole::Additive)
        .with_formula(FuelCombustion::from_parameters(Default::default()))
}

fn carbonate() -> CategoryConfig {
    CategoryConfig::new(CARBONATE, "Carbonate decomposition", AggregateRole::Additive)
        .with_formula(CarbonateDecomposition::from_parameters(Default::default()))
}

fn flaring() -> CategoryConfig {
    CategoryConfig::new(FLARING, "Flare combustion", AggregateRole::Additive).with_formula(
        ActivityFactor::from_parameters(ActivityFactorParameters::process(
            "flaring_gas",
            2.74,
            "tCO2/10^4Nm^3",
        )),
    )
}

fn co2_recovery() -> CategoryConfig {
    CategoryConfig::new(CO2_RECOVERY, "CO2 recovered for use", AggregateRole::Deduction)
        .with_formula(GasRecovery::from_parameters(GasRecoveryParameters::default()))
}

fn ch4_recovery() -> CategoryConfig {
    CategoryConfig::new("ch4_recovery", "CH4 recovered for use", AggregateRole::Deduction)
        .with_formula(GasRecovery::from_parameters(GasRecoveryParameters::methane()))
}

fn electricity(industry: &str) -> CategoryConfig {
    CategoryConfig::new(ELECTRICITY, "Purchased electricity", AggregateRole::ElectricityHeat)
        .with_formula(NetPurchase::electricity())
        .with_seed(EntitySeed::new(seed_id(industry, ELECTRICITY), "Grid electricity").pinned())
}

fn heat(industry: &str) -> CategoryConfig {
    CategoryConfig::new(HEAT, "Purchased heat", AggregateRole::ElectricityHeat)
        .with_formula(NetPurchase::heat())
        .with_seed(EntitySeed::new(seed_id(industry, HEAT), "Steam").pinned())
}

/// Append the purchased energy categories shared by every sector.
fn with_purchased_energy(industry: IndustryConfig) -> IndustryConfig {
    let key = industry.key.clone();
    industry
        .with_category(electricity(&key))
        .with_category(heat(&key))
}
