//! Built-in factor tables.
//!
//! Values follow the national accounting guidelines for the covered sectors. GWP values are
//! on the IPCC SAR basis those guidelines use. Grid factors are regional averages quoted
//! per kWh.

use crate::timeseries::FloatValue;
use categories::*;

/// Registry categories used by the built-in tables.
pub mod categories {
    pub const ELECTRICITY: &str = "electricity";
    pub const HEAT: &str = "heat";
    pub const GWP: &str = "gwp";
    pub const CARBONATE: &str = "carbonate";
    pub const FUEL_NCV: &str = "fuel_ncv";
    pub const FUEL_CARBON_CONTENT: &str = "fuel_carbon_content";
    pub const FUEL_OXIDATION: &str = "fuel_oxidation";
    pub const GAS_DENSITY: &str = "gas_density";
    pub const FUGITIVE_DEVICE: &str = "fugitive_device";
    pub const FUGITIVE_VOLUME: &str = "fugitive_volume";
    pub const BYPRODUCT_GENERATION: &str = "byproduct_generation";
    pub const ANODE_EFFECT: &str = "anode_effect";
    pub const PROCESS: &str = "process";
}

/// Ratio of the molecular weight of CO2 to that of carbon.
pub const CO2_PER_CARBON: FloatValue = 44.0 / 12.0;

/// Ratio of the molecular weight of CO2 to that of HFC-23 (CHF3).
pub const CO2_PER_HFC23: FloatValue = 44.0 / 70.0;

/// A built-in factor entry.
#[derive(Debug, Clone, Copy)]
pub struct StaticFactor {
    pub category: &'static str,
    pub key: &'static str,
    pub year: Option<u16>,
    pub value: FloatValue,
    pub unit: &'static str,
}

const fn factor(
    category: &'static str,
    key: &'static str,
    year: Option<u16>,
    value: FloatValue,
    unit: &'static str,
) -> StaticFactor {
    StaticFactor {
        category,
        key,
        year,
        value,
        unit,
    }
}

pub static BUILTIN_FACTORS: &[StaticFactor] = &[
    // Regional grid average emission factors
    factor(ELECTRICITY, "华北", Some(2022), 0.0006776, "tCO2/kWh"),
    factor(ELECTRICITY, "东北", Some(2022), 0.0005914, "tCO2/kWh"),
    factor(ELECTRICITY, "华东", Some(2022), 0.0005887, "tCO2/kWh"),
    factor(ELECTRICITY, "华中", Some(2022), 0.0005388, "tCO2/kWh"),
    factor(ELECTRICITY, "西北", Some(2022), 0.0006082, "tCO2/kWh"),
    factor(ELECTRICITY, "南方", Some(2022), 0.0004869, "tCO2/kWh"),
    factor(ELECTRICITY, "全国", Some(2022), 0.0005703, "tCO2/kWh"),
    factor(ELECTRICITY, "华北", Some(2012), 0.0008843, "tCO2/kWh"),
    factor(ELECTRICITY, "东北", Some(2012), 0.0007769, "tCO2/kWh"),
    factor(ELECTRICITY, "华东", Some(2012), 0.0007035, "tCO2/kWh"),
    factor(ELECTRICITY, "华中", Some(2012), 0.0005257, "tCO2/kWh"),
    factor(ELECTRICITY, "西北", Some(2012), 0.0006671, "tCO2/kWh"),
    factor(ELECTRICITY, "南方", Some(2012), 0.0005271, "tCO2/kWh"),
    factor(HEAT, "steam", None, 0.11, "tCO2/GJ"),
    factor(HEAT, "hot_water", None, 0.11, "tCO2/GJ"),
    // Global warming potentials
    factor(GWP, "CO2", None, 1.0, "tCO2e/t"),
    factor(GWP, "CH4", None, 21.0, "tCO2e/t"),
    factor(GWP, "N2O", None, 310.0, "tCO2e/t"),
    factor(GWP, "HFC-23", None, 11700.0, "tCO2e/t"),
    factor(GWP, "HFC-32", None, 650.0, "tCO2e/t"),
    factor(GWP, "HFC-125", None, 2800.0, "tCO2e/t"),
    factor(GWP, "HFC-134a", None, 1300.0, "tCO2e/t"),
    factor(GWP, "HFC-143a", None, 3800.0, "tCO2e/t"),
    factor(GWP, "HFC-152a", None, 140.0, "tCO2e/t"),
    factor(GWP, "HFC-227ea", None, 2900.0, "tCO2e/t"),
    factor(GWP, "HFC-236fa", None, 6300.0, "tCO2e/t"),
    factor(GWP, "CF4", None, 6500.0, "tCO2e/t"),
    factor(GWP, "C2F6", None, 9200.0, "tCO2e/t"),
    factor(GWP, "SF6", None, 23900.0, "tCO2e/t"),
    // Carbonate decomposition
    factor(CARBONATE, "CaCO3", None, 0.440, "tCO2/t"),
    factor(CARBONATE, "MgCO3", None, 0.522, "tCO2/t"),
    factor(CARBONATE, "CaMg(CO3)2", None, 0.477, "tCO2/t"),
    factor(CARBONATE, "FeCO3", None, 0.380, "tCO2/t"),
    factor(CARBONATE, "Na2CO3", None, 0.415, "tCO2/t"),
    factor(CARBONATE, "BaCO3", None, 0.223, "tCO2/t"),
    factor(CARBONATE, "Li2CO3", None, 0.596, "tCO2/t"),
    factor(CARBONATE, "K2CO3", None, 0.318, "tCO2/t"),
    factor(CARBONATE, "SrCO3", None, 0.298, "tCO2/t"),
    // Fuel properties: net calorific value
    factor(FUEL_NCV, "raw_coal", None, 20.908, "GJ/t"),
    factor(FUEL_NCV, "coke", None, 28.435, "GJ/t"),
    factor(FUEL_NCV, "crude_oil", None, 41.816, "GJ/t"),
    factor(FUEL_NCV, "fuel_oil", None, 41.816, "GJ/t"),
    factor(FUEL_NCV, "gasoline", None, 43.070, "GJ/t"),
    factor(FUEL_NCV, "diesel", None, 42.652, "GJ/t"),
    factor(FUEL_NCV, "lpg", None, 50.179, "GJ/t"),
    factor(FUEL_NCV, "refinery_gas", None, 45.998, "GJ/t"),
    factor(FUEL_NCV, "natural_gas", None, 389.31, "GJ/10^4Nm^3"),
    factor(FUEL_NCV, "coke_oven_gas", None, 179.81, "GJ/10^4Nm^3"),
    // Fuel properties: carbon content per unit heat
    factor(FUEL_CARBON_CONTENT, "raw_coal", None, 0.02618, "tC/GJ"),
    factor(FUEL_CARBON_CONTENT, "coke", None, 0.0295, "tC/GJ"),
    factor(FUEL_CARBON_CONTENT, "crude_oil", None, 0.0201, "tC/GJ"),
    factor(FUEL_CARBON_CONTENT, "fuel_oil", None, 0.0211, "tC/GJ"),
    factor(FUEL_CARBON_CONTENT, "gasoline", None, 0.0189, "tC/GJ"),
    factor(FUEL_CARBON_CONTENT, "diesel", None, 0.0202, "tC/GJ"),
    factor(FUEL_CARBON_CONTENT, "lpg", None, 0.0172, "tC/GJ"),
    factor(FUEL_CARBON_CONTENT, "refinery_gas", None, 0.0182, "tC/GJ"),
    factor(FUEL_CARBON_CONTENT, "natural_gas", None, 0.01532, "tC/GJ"),
    factor(FUEL_CARBON_CONTENT, "coke_oven_gas", None, 0.0136, "tC/GJ"),
    // Fuel properties: carbon oxidation rate
    factor(FUEL_OXIDATION, "raw_coal", None, 0.94, ""),
    factor(FUEL_OXIDATION, "coke", None, 0.93, ""),
    factor(FUEL_OXIDATION, "crude_oil", None, 0.98, ""),
    factor(FUEL_OXIDATION, "fuel_oil", None, 0.98, ""),
    factor(FUEL_OXIDATION, "gasoline", None, 0.98, ""),
    factor(FUEL_OXIDATION, "diesel", None, 0.98, ""),
    factor(FUEL_OXIDATION, "lpg", None, 0.98, ""),
    factor(FUEL_OXIDATION, "refinery_gas", None, 0.99, ""),
    factor(FUEL_OXIDATION, "natural_gas", None, 0.99, ""),
    factor(FUEL_OXIDATION, "coke_oven_gas", None, 0.99, ""),
    // Gas density at standard conditions
    factor(GAS_DENSITY, "CO2", None, 19.77, "t/10^4Nm^3"),
    factor(GAS_DENSITY, "CH4", None, 7.17, "t/10^4Nm^3"),
    // Oil and gas fugitive emissions
    factor(FUGITIVE_DEVICE, "wellhead", None, 2.5, "tCH4/unit"),
    factor(FUGITIVE_DEVICE, "separator", None, 3.7, "tCH4/unit"),
    factor(FUGITIVE_DEVICE, "compressor", None, 28.0, "tCH4/unit"),
    factor(FUGITIVE_DEVICE, "dehydrator", None, 2.2, "tCH4/unit"),
    factor(FUGITIVE_DEVICE, "heater", None, 1.5, "tCH4/unit"),
    factor(FUGITIVE_DEVICE, "pneumatic_device", None, 0.4, "tCH4/unit"),
    factor(FUGITIVE_VOLUME, "gas_processing", None, 0.0103, "tCH4/10^4Nm^3"),
    factor(FUGITIVE_VOLUME, "gas_transmission", None, 0.0086, "tCH4/10^4Nm^3"),
    factor(FUGITIVE_VOLUME, "oil_storage", None, 0.0022, "tCH4/10^4Nm^3"),
    factor(FUGITIVE_VOLUME, "venting", None, 0.0135, "tCH4/10^4Nm^3"),
    // By-product generation
    factor(BYPRODUCT_GENERATION, "HCFC-22", None, 0.0292, "tHFC-23/tHCFC-22"),
    // Aluminium anode effects
    factor(ANODE_EFFECT, "CF4", None, 0.034, "kg/tAl"),
    factor(ANODE_EFFECT, "C2F6", None, 0.0034, "kg/tAl"),
    // Process factors
    factor(PROCESS, "prebaked_anode", None, 1.6, "tCO2/tAl"),
    factor(PROCESS, "electrode", None, 3.663, "tCO2/t"),
    factor(PROCESS, "flaring_gas", None, 2.74, "tCO2/10^4Nm^3"),
    factor(PROCESS, "crude_steel_carbon", None, 0.0154, "tC/t"),
];
