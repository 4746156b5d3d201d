//! Fugitive and vented methane from oil and gas facilities
//!
//! Each entity is a device or a process stream. Devices are counted; streams are
//! metered by throughput. The `metric_type` attribute selects which activity is used.

use ghg_core::factors::FactorRequirement;
use ghg_core::formula::{Formula, FormulaSpec, InputState, OutputState};
use ghg_core::standard_factors::categories::{FUGITIVE_DEVICE, FUGITIVE_VOLUME, GWP};
use ghg_core::standard_indicators::{
    IND_DEVICE_COUNT, IND_EMISSION, IND_EMISSION_FACTOR, IND_GAS_MASS, IND_GWP, IND_THROUGHPUT,
};
use ghg_core::timeseries::FloatValue;
use log::debug;
use serde::{Deserialize, Serialize};

const DEVICE_FACTOR: &str = "device_factor";
const VOLUME_FACTOR: &str = "volume_factor";
const GWP_FACTOR: &str = "gwp";

pub const METRIC_TYPE_ATTRIBUTE: &str = "metric_type";
pub const DEVICE_TYPE_ATTRIBUTE: &str = "device_type";
pub const PROCESS_ATTRIBUTE: &str = "process";
pub const GAS_ATTRIBUTE: &str = "gas";

/// How the activity of a fugitive source is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    #[default]
    Count,
    Volume,
}

impl MetricType {
    /// Parse the `metric_type` attribute; anything but "volume" counts devices.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("volume") => MetricType::Volume,
            Some(v) if v.eq_ignore_ascii_case("count") => MetricType::Count,
            None => MetricType::Count,
            Some(other) => {
                debug!("Unrecognised metric type {:?}, counting devices", other);
                MetricType::Count
            }
        }
    }
}

/// Parameters for fugitive emissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FugitiveEmissionParameters {
    /// Registry key used when the entity does not name its gas
    pub gas: String,
    pub default_gwp: FloatValue,
    /// unit: t gas / device
    pub default_device_factor: FloatValue,
    /// unit: t gas / 10^4 Nm^3
    pub default_volume_factor: FloatValue,
}

impl Default for FugitiveEmissionParameters {
    fn default() -> Self {
        Self {
            gas: "CH4".to_string(),
            default_gwp: 21.0,
            default_device_factor: 0.0,
            default_volume_factor: 0.0,
        }
    }
}

/// Fugitive emissions of a device or stream
///
/// $$ E = n \cdot EF_{device} \cdot GWP $$ for counted devices, or
/// $$ E = V \cdot EF_{volume} \cdot GWP $$ for metered streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FugitiveEmission {
    #[serde(flatten)]
    parameters: FugitiveEmissionParameters,
}

impl FugitiveEmission {
    pub fn from_parameters(parameters: FugitiveEmissionParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate_gas_mass(&self, activity: FloatValue, factor: FloatValue) -> FloatValue {
        (activity * factor).max(0.0)
    }

    pub fn calculate_emission(&self, gas_mass: FloatValue, gwp: FloatValue) -> FloatValue {
        gas_mass * gwp
    }
}

#[typetag::serde]
impl Formula for FugitiveEmission {
    fn spec(&self) -> FormulaSpec {
        FormulaSpec::new()
            .input(IND_DEVICE_COUNT.key)
            .input(IND_THROUGHPUT.key)
            .factor(
                FactorRequirement::by_attribute(
                    DEVICE_FACTOR,
                    FUGITIVE_DEVICE,
                    DEVICE_TYPE_ATTRIBUTE,
                    self.parameters.default_device_factor,
                    "t/unit",
                )
                .with_override(IND_EMISSION_FACTOR.key),
            )
            .factor(
                FactorRequirement::by_attribute(
                    VOLUME_FACTOR,
                    FUGITIVE_VOLUME,
                    PROCESS_ATTRIBUTE,
                    self.parameters.default_volume_factor,
                    "t/10^4Nm^3",
                )
                .with_override(IND_EMISSION_FACTOR.key),
            )
            .factor(
                FactorRequirement::by_attribute(
                    GWP_FACTOR,
                    GWP,
                    GAS_ATTRIBUTE,
                    self.parameters.default_gwp,
                    "tCO2e/t",
                )
                .with_fallback_key(self.parameters.gas.clone())
                .with_override(IND_GWP.key),
            )
            .output(IND_GAS_MASS.key)
            .output(IND_EMISSION.key)
    }

    fn evaluate(&self, inputs: &InputState) -> OutputState {
        let gas_mass = match MetricType::from_attribute(inputs.attribute(METRIC_TYPE_ATTRIBUTE)) {
            MetricType::Count => self.calculate_gas_mass(
                inputs.get(IND_DEVICE_COUNT.key),
                inputs.factor(DEVICE_FACTOR),
            ),
            MetricType::Volume => self.calculate_gas_mass(
                inputs.get(IND_THROUGHPUT.key),
                inputs.factor(VOLUME_FACTOR),
            ),
        };
        let emission = self.calculate_emission(gas_mass, inputs.factor(GWP_FACTOR));

        OutputState::from([
            (IND_GAS_MASS.key.to_string(), gas_mass),
            (IND_EMISSION.key.to_string(), emission),
        ])
    }
}
