//! Standard indicator definitions.
//!
//! These are the indicators shared by the calculation families in `ghg-components`.
//! All are registered at compile time and available through
//! [`INDICATOR_REGISTRY`](crate::indicator::INDICATOR_REGISTRY).
//!
//! Masses are in tonnes, gas volumes in 10^4 Nm^3 and emissions in tCO2e unless a
//! definition says otherwise.

use crate::define_static_indicator;
use crate::indicator::IndicatorKind;

// ============================================================================
// Activity data
// ============================================================================

define_static_indicator!(
    IND_PURCHASED,
    key = "purchased",
    unit = "kWh",
    kind = IndicatorKind::Activity,
    description = "Electricity or heat purchased from outside the boundary",
);

define_static_indicator!(
    IND_EXTERNAL_SUPPLY,
    key = "external_supply",
    unit = "kWh",
    kind = IndicatorKind::Activity,
    description = "Electricity or heat supplied to parties outside the boundary",
);

define_static_indicator!(
    IND_CONSUMPTION,
    key = "consumption",
    unit = "t",
    kind = IndicatorKind::Activity,
    description = "Amount of fuel or raw material consumed",
);

define_static_indicator!(
    IND_PURITY,
    key = "purity",
    unit = "%",
    kind = IndicatorKind::Activity,
    description = "Mass or volume purity of a material or recovered gas",
);

define_static_indicator!(
    IND_PRODUCTION,
    key = "production",
    unit = "t",
    kind = IndicatorKind::Activity,
    description = "Product output of a production line",
);

define_static_indicator!(
    IND_RECOVERY,
    key = "recovery",
    unit = "t",
    kind = IndicatorKind::Activity,
    description = "By-product gas recovered for sale or reuse",
);

define_static_indicator!(
    IND_DESTROYED_INPUT,
    key = "destroyed_input",
    unit = "t",
    kind = IndicatorKind::Activity,
    description = "By-product gas fed to the destruction unit",
);

define_static_indicator!(
    IND_DESTROYED_OUTPUT,
    key = "destroyed_output",
    unit = "t",
    kind = IndicatorKind::Activity,
    description = "By-product gas leaving the destruction unit undestroyed",
);

define_static_indicator!(
    IND_DEVICE_COUNT,
    key = "device_count",
    unit = "unit",
    kind = IndicatorKind::Activity,
    description = "Number of devices of one type in service",
);

define_static_indicator!(
    IND_THROUGHPUT,
    key = "throughput",
    unit = "10^4 Nm^3",
    kind = IndicatorKind::Activity,
    description = "Gas volume processed by a device",
);

define_static_indicator!(
    IND_ACTIVITY,
    key = "activity",
    unit = "t",
    kind = IndicatorKind::Activity,
    description = "Generic activity amount multiplied by a single emission factor",
);

define_static_indicator!(
    IND_INPUT_AMOUNT,
    key = "input_amount",
    unit = "t",
    kind = IndicatorKind::Activity,
    description = "Carbon-bearing material entering a process",
);

define_static_indicator!(
    IND_INPUT_CARBON,
    key = "input_carbon",
    unit = "tC/t",
    kind = IndicatorKind::Activity,
    description = "Carbon content of the material entering a process",
);

define_static_indicator!(
    IND_OUTPUT_AMOUNT,
    key = "output_amount",
    unit = "t",
    kind = IndicatorKind::Activity,
    description = "Carbon-bearing product or waste leaving a process",
);

define_static_indicator!(
    IND_OUTPUT_CARBON,
    key = "output_carbon",
    unit = "tC/t",
    kind = IndicatorKind::Activity,
    description = "Carbon content of the material leaving a process",
);

define_static_indicator!(
    IND_RECOVERED_VOLUME,
    key = "recovered_volume",
    unit = "10^4 Nm^3",
    kind = IndicatorKind::Activity,
    description = "Gas volume captured and recovered",
);

// ============================================================================
// Factor overrides
// ============================================================================

define_static_indicator!(
    IND_EMISSION_FACTOR,
    key = "emission_factor",
    unit = "",
    kind = IndicatorKind::Override,
    description = "Measured emission factor replacing the default",
);

define_static_indicator!(
    IND_GWP,
    key = "gwp",
    unit = "tCO2e/t",
    kind = IndicatorKind::Override,
    description = "Global warming potential replacing the default",
);

define_static_indicator!(
    IND_NCV,
    key = "ncv",
    unit = "GJ/t",
    kind = IndicatorKind::Override,
    description = "Measured net calorific value of a fuel",
);

define_static_indicator!(
    IND_CARBON_CONTENT,
    key = "carbon_content",
    unit = "tC/GJ",
    kind = IndicatorKind::Override,
    description = "Measured carbon content per unit heat of a fuel",
);

define_static_indicator!(
    IND_OXIDATION_RATE,
    key = "oxidation_rate",
    unit = "",
    kind = IndicatorKind::Override,
    description = "Measured carbon oxidation rate of a fuel",
);

// ============================================================================
// Derived indicators
// ============================================================================

define_static_indicator!(
    IND_NET_AMOUNT,
    key = "net_amount",
    unit = "kWh",
    kind = IndicatorKind::Derived,
    description = "Purchased minus externally supplied, floored at zero",
);

define_static_indicator!(
    IND_GENERATED,
    key = "generated",
    unit = "t",
    kind = IndicatorKind::Derived,
    description = "By-product gas generated by all production lines",
);

define_static_indicator!(
    IND_DESTROYED,
    key = "destroyed",
    unit = "t",
    kind = IndicatorKind::Derived,
    description = "By-product gas destroyed",
);

define_static_indicator!(
    IND_NET_EMISSION,
    key = "net_emission",
    unit = "t",
    kind = IndicatorKind::Derived,
    description = "Gas mass emitted after recovery and destruction",
);

define_static_indicator!(
    IND_GAS_MASS,
    key = "gas_mass",
    unit = "t",
    kind = IndicatorKind::Derived,
    description = "Mass of the emitted or recovered gas before GWP weighting",
);

define_static_indicator!(
    IND_EMISSION,
    key = "emission",
    unit = "tCO2e",
    kind = IndicatorKind::Derived,
    description = "Emission of an entity; the indicator summed into category totals",
);
