use crate::indicator::{IndicatorKind, INDICATOR_REGISTRY};
use crate::timeseries::{FloatValue, Month, MonthMetadata, MonthlySeries, RawValue, MONTHS};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorItem {
    pub key: String,
    pub kind: IndicatorKind,
    pub series: MonthlySeries,
}

impl IndicatorItem {
    pub fn new(key: impl Into<String>, kind: IndicatorKind) -> Self {
        let key = key.into();
        let unit = INDICATOR_REGISTRY.unit_of(&key);
        Self {
            series: MonthlySeries::empty(&unit),
            key,
            kind,
        }
    }

    /// Copy of the item with one month set, or `None` if the edit changes nothing.
    ///
    /// Activity values are compared after coercion, so "5" over 5.0 is a no-op. Override
    /// slots additionally distinguish empty from an entered zero, since emptiness decides
    /// whether the override applies.
    pub fn with_raw(&self, month: Month, raw: RawValue) -> Option<Self> {
        let current = self.series.raw(month);
        let unchanged = match self.kind {
            IndicatorKind::Override => current.entered() == raw.entered(),
            IndicatorKind::Activity | IndicatorKind::Derived => current.coerce() == raw.coerce(),
        };
        if unchanged {
            return None;
        }
        Some(Self {
            series: self.series.with_raw(month, raw),
            ..self.clone()
        })
    }

    /// Copy of a derived item carrying new values, or `None` if they are equal.
    pub fn with_values(&self, values: [FloatValue; MONTHS]) -> Option<Self> {
        if self.series.values() == values {
            return None;
        }
        Some(Self {
            series: self.series.with_values(values),
            ..self.clone()
        })
    }
}

/// The indicator series owned by one entity.
///
/// Items are shared through `Arc`; an edit produces a new collection in which only the
/// touched item is a new allocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorCollection {
    items: Vec<Arc<IndicatorItem>>,
}

impl IndicatorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty series. Returns false if the key already exists.
    pub fn add_series(&mut self, key: &str, kind: IndicatorKind) -> bool {
        if self.get_by_key(key).is_some() {
            return false;
        }
        self.items.push(Arc::new(IndicatorItem::new(key, kind)));
        true
    }

    pub fn get_by_key(&self, key: &str) -> Option<&Arc<IndicatorItem>> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn get_series(&self, key: &str) -> Option<&MonthlySeries> {
        self.get_by_key(key).map(|item| &item.series)
    }

    /// Numeric value of an indicator; a missing indicator reads as zero.
    pub fn value(&self, key: &str, month: Month) -> FloatValue {
        self.get_series(key).map_or(0.0, |s| s.value(month))
    }

    /// The entered value of an indicator, `None` when the slot (or the indicator) is empty.
    pub fn entered(&self, key: &str, month: Month) -> Option<FloatValue> {
        self.get_series(key).and_then(|s| s.raw(month).entered())
    }

    pub fn values(&self, key: &str) -> [FloatValue; MONTHS] {
        self.get_series(key).map_or([0.0; MONTHS], MonthlySeries::values)
    }

    /// Collection with `key` replaced by the item `f` returns, or `None` if the key is
    /// unknown or `f` declines the update.
    pub fn with_item<F>(&self, key: &str, f: F) -> Option<Self>
    where
        F: FnOnce(&IndicatorItem) -> Option<IndicatorItem>,
    {
        let position = self.items.iter().position(|item| item.key == key)?;
        let replacement = f(&self.items[position])?;
        let mut items = self.items.clone();
        items[position] = Arc::new(replacement);
        Some(Self { items })
    }

    pub fn with_metadata(&self, key: &str, month: Month, metadata: MonthMetadata) -> Option<Self> {
        self.with_item(key, |item| {
            Some(IndicatorItem {
                series: item.series.with_metadata(month, metadata),
                ..item.clone()
            })
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<IndicatorItem>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
