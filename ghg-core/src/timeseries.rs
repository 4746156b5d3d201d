//! Twelve-month indicator series.
//!
//! Every indicator an entity owns is stored as a fixed January..December series.
//! A month slot keeps the verbatim value the user entered next to the number used for
//! arithmetic, so an empty slot is displayed as empty while still counting as zero.

use crate::errors::GhgError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type FloatValue = f64;

/// Number of slots in every series.
pub const MONTHS: usize = 12;

/// A calendar month, 1 (January) to 12 (December).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(u8);

impl Month {
    pub fn new(number: u8) -> Option<Self> {
        (1..=MONTHS as u8).contains(&number).then_some(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based position of the month within a series.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn all() -> impl Iterator<Item = Month> {
        (1..=MONTHS as u8).map(Month)
    }
}

impl TryFrom<u8> for Month {
    type Error = GhgError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Month::new(value).ok_or(GhgError::InvalidMonth(value))
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.0
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A value as entered by the user.
///
/// The raw form is kept for display. Arithmetic always goes through [`RawValue::coerce`],
/// which maps anything non-numeric (including an empty entry) to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(FloatValue),
    Text(String),
}

impl RawValue {
    pub fn empty() -> Self {
        RawValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawValue::Text(text) if text.trim().is_empty())
    }

    /// Numeric value used for arithmetic.
    pub fn coerce(&self) -> FloatValue {
        match self {
            RawValue::Number(value) if value.is_finite() => *value,
            RawValue::Number(value) => {
                debug!("Non-finite input {} treated as 0", value);
                0.0
            }
            RawValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return 0.0;
                }
                match trimmed.parse::<FloatValue>() {
                    Ok(value) if value.is_finite() => value,
                    _ => {
                        debug!("Could not coerce {:?} to a number, treating as 0", text);
                        0.0
                    }
                }
            }
        }
    }

    /// The coerced value, or `None` when nothing was entered.
    pub fn entered(&self) -> Option<FloatValue> {
        (!self.is_empty()).then(|| self.coerce())
    }
}

impl Default for RawValue {
    fn default() -> Self {
        RawValue::empty()
    }
}

impl From<FloatValue> for RawValue {
    fn from(value: FloatValue) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(value) => write!(f, "{}", value),
            RawValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Opaque handle to an uploaded supporting document.
///
/// The file itself lives with whatever storage the host application uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingMaterial {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub media_type: String,
    pub path: String,
}

/// Descriptive fields of a month slot that never take part in arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthMetadata {
    pub unit: Option<String>,
    pub data_source: Option<String>,
    pub material: Option<SupportingMaterial>,
}

/// One month of an indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthSlot {
    pub raw: RawValue,
    pub unit: String,
    pub data_source: Option<String>,
    pub material: Option<SupportingMaterial>,
}

impl MonthSlot {
    pub fn value(&self) -> FloatValue {
        self.raw.coerce()
    }
}

/// January..December values of a single indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    slots: [MonthSlot; MONTHS],
}

impl MonthlySeries {
    /// An empty series whose slots all carry `unit`.
    pub fn empty(unit: &str) -> Self {
        let mut series = Self::default();
        for slot in series.slots.iter_mut() {
            slot.unit = unit.to_string();
        }
        series
    }

    pub fn slot(&self, month: Month) -> &MonthSlot {
        &self.slots[month.index()]
    }

    pub fn raw(&self, month: Month) -> &RawValue {
        &self.slot(month).raw
    }

    pub fn value(&self, month: Month) -> FloatValue {
        self.slot(month).value()
    }

    pub fn values(&self) -> [FloatValue; MONTHS] {
        std::array::from_fn(|i| self.slots[i].value())
    }

    /// Sum of the twelve months at full precision.
    pub fn total(&self) -> FloatValue {
        self.slots.iter().map(MonthSlot::value).sum()
    }

    pub fn slots(&self) -> &[MonthSlot; MONTHS] {
        &self.slots
    }

    /// Copy of the series with one month replaced.
    pub fn with_raw(&self, month: Month, raw: RawValue) -> Self {
        let mut series = self.clone();
        series.slots[month.index()].raw = raw;
        series
    }

    /// Copy of the series with its numeric values replaced.
    ///
    /// Used for derived indicators, which are never entered by hand.
    pub fn with_values(&self, values: [FloatValue; MONTHS]) -> Self {
        let mut series = self.clone();
        for (slot, value) in series.slots.iter_mut().zip(values) {
            slot.raw = RawValue::Number(value);
        }
        series
    }

    /// Copy of the series with the metadata of one month updated.
    ///
    /// Fields left as `None` in `metadata` are kept.
    pub fn with_metadata(&self, month: Month, metadata: MonthMetadata) -> Self {
        let mut series = self.clone();
        let slot = &mut series.slots[month.index()];
        if let Some(unit) = metadata.unit {
            slot.unit = unit;
        }
        if let Some(data_source) = metadata.data_source {
            slot.data_source = Some(data_source);
        }
        if let Some(material) = metadata.material {
            slot.material = Some(material);
        }
        series
    }

    pub fn without_material(&self, month: Month) -> Self {
        let mut series = self.clone();
        series.slots[month.index()].material = None;
        series
    }
}

/// Fixed-decimal rendering of a value for display.
///
/// Stored values are never rounded; this is the only place rounding happens.
pub fn format_value(value: FloatValue, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    // "-0.00" reads as a negative emission
    if formatted.starts_with('-') && formatted[1..].chars().all(|c| c == '0' || c == '.') {
        formatted[1..].to_string()
    } else {
        formatted
    }
}
