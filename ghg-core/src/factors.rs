//! Factor registry and the factor resolution chain.
//!
//! Every factor a formula needs is resolved in three tiers:
//!
//! 1. an explicit per-entity, per-month override (a non-empty slot of the requirement's
//!    override indicator),
//! 2. a registry lookup by category, key and reporting year,
//! 3. the hardcoded default carried by the [`FactorRequirement`].
//!
//! A miss at any tier silently falls through to the next one.
//!
//! The registry starts with the built-in tables from
//! [`standard_factors`](crate::standard_factors). Users may append custom entries; those get
//! fresh ids, shadow a built-in with the same key while they exist and can be removed again.
//! Built-in entries are never modified or removed.

use crate::standard_factors::BUILTIN_FACTORS;
use crate::timeseries::FloatValue;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

pub type FactorId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorOrigin {
    BuiltIn,
    Custom,
}

/// An immutable registry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorEntry {
    pub id: FactorId,
    pub category: String,
    pub key: String,
    pub year: Option<u16>,
    pub value: FloatValue,
    pub unit: String,
    pub origin: FactorOrigin,
}

/// A user-supplied factor, e.g. a custom material with its own emission factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFactor {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    pub value: FloatValue,
    #[serde(default)]
    pub unit: String,
}

impl CustomFactor {
    pub fn new(key: impl Into<String>, value: FloatValue, unit: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            year: None,
            value,
            unit: unit.into(),
        }
    }

    pub fn for_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }
}

static BUILTIN_ENTRIES: LazyLock<Vec<Arc<FactorEntry>>> = LazyLock::new(|| {
    BUILTIN_FACTORS
        .iter()
        .enumerate()
        .map(|(i, f)| {
            Arc::new(FactorEntry {
                id: i as FactorId,
                category: f.category.to_string(),
                key: f.key.to_string(),
                year: f.year,
                value: f.value,
                unit: f.unit.to_string(),
                origin: FactorOrigin::BuiltIn,
            })
        })
        .collect()
});

/// Lookup tables of emission factors, GWPs and other constants.
#[derive(Debug, Clone)]
pub struct FactorRegistry {
    /// Entries in registration order; built-ins first.
    entries: Vec<Arc<FactorEntry>>,
    next_id: FactorId,
}

impl Default for FactorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FactorRegistry {
    /// A registry holding the built-in tables.
    pub fn new() -> Self {
        let entries = BUILTIN_ENTRIES.clone();
        let next_id = entries.len() as FactorId;
        Self { entries, next_id }
    }

    /// A registry with no entries at all; every lookup falls back to defaults.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            next_id: BUILTIN_ENTRIES.len() as FactorId,
        }
    }

    /// Find the factor for `category`/`key`.
    ///
    /// With a year, an entry for exactly that year wins over a year-agnostic one. Without
    /// a year, the year-agnostic entry wins over the most recent year. Among equally good
    /// matches the most recently registered entry wins.
    pub fn lookup(&self, category: &str, key: &str, year: Option<u16>) -> Option<&FactorEntry> {
        let mut candidates = self
            .entries
            .iter()
            .rev()
            .filter(|e| e.category == category && e.key == key)
            .map(Arc::as_ref);

        match year {
            Some(year) => {
                let candidates: Vec<&FactorEntry> = candidates.collect();
                candidates
                    .iter()
                    .find(|e| e.year == Some(year))
                    .or_else(|| candidates.iter().find(|e| e.year.is_none()))
                    .copied()
            }
            None => {
                let mut latest: Option<&FactorEntry> = None;
                for entry in candidates.by_ref() {
                    match entry.year {
                        None => return Some(entry),
                        Some(y) if latest.map_or(true, |l| l.year < Some(y)) => {
                            latest = Some(entry)
                        }
                        Some(_) => {}
                    }
                }
                latest
            }
        }
    }

    /// Append a custom entry; existing entries are left untouched.
    pub fn register(&mut self, category: &str, factor: CustomFactor) -> FactorId {
        let id = self.next_id;
        self.next_id += 1;
        info!(
            "Registered custom factor {} for {}/{} ({:?}) = {}",
            id, category, factor.key, factor.year, factor.value
        );
        self.entries.push(Arc::new(FactorEntry {
            id,
            category: category.to_string(),
            key: factor.key,
            year: factor.year,
            value: factor.value,
            unit: factor.unit,
            origin: FactorOrigin::Custom,
        }));
        id
    }

    /// Remove a custom entry. Built-in entries and unknown ids are ignored.
    pub fn remove(&mut self, id: FactorId) -> bool {
        let position = self
            .entries
            .iter()
            .position(|e| e.id == id && e.origin == FactorOrigin::Custom);
        match position {
            Some(position) => {
                self.entries.remove(position);
                info!("Removed custom factor {}", id);
                true
            }
            None => {
                debug!("Factor {} is unknown or built-in; not removed", id);
                false
            }
        }
    }

    pub fn get(&self, id: FactorId) -> Option<&FactorEntry> {
        self.entries.iter().find(|e| e.id == id).map(Arc::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FactorEntry> {
        self.entries.iter().map(Arc::as_ref)
    }

    /// Entries of one category in registration order.
    pub fn category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a FactorEntry> {
        self.iter().filter(move |e| e.category == category)
    }

    pub fn custom_entries(&self) -> impl Iterator<Item = &FactorEntry> {
        self.iter().filter(|e| e.origin == FactorOrigin::Custom)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where the registry key of a factor comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeySource {
    /// Always the same key (e.g. the GWP of "HFC-23").
    Fixed(String),
    /// Taken from an entity attribute such as its region, fuel or material.
    ///
    /// When the entity does not carry the attribute, `fallback` is used; without a
    /// fallback the registry tier is skipped.
    Attribute {
        name: String,
        fallback: Option<String>,
    },
}

/// The tier a factor was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorTier {
    Override,
    Registry,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFactor {
    pub value: FloatValue,
    pub tier: FactorTier,
}

/// Attributes and reporting year a factor is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct FactorContext<'a> {
    pub year: Option<u16>,
    /// Attributes of the entity being evaluated
    pub attributes: &'a BTreeMap<String, String>,
    /// Module-wide attribute defaults (e.g. the enterprise's grid region)
    pub defaults: &'a BTreeMap<String, String>,
}

impl<'a> FactorContext<'a> {
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes
            .get(name)
            .or_else(|| self.defaults.get(name))
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// A factor a formula needs, with everything required to resolve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRequirement {
    /// Name the formula reads the factor by
    pub name: String,
    /// Registry category
    pub category: String,
    pub key: KeySource,
    /// Indicator whose non-empty slots override the factor month by month
    pub override_indicator: Option<String>,
    /// Whether the registry lookup uses the reporting year
    pub year_sensitive: bool,
    /// Hardcoded last-resort value
    pub default: FloatValue,
    pub unit: String,
}

impl FactorRequirement {
    pub fn fixed(
        name: impl Into<String>,
        category: impl Into<String>,
        key: impl Into<String>,
        default: FloatValue,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            key: KeySource::Fixed(key.into()),
            override_indicator: None,
            year_sensitive: false,
            default,
            unit: unit.into(),
        }
    }

    pub fn by_attribute(
        name: impl Into<String>,
        category: impl Into<String>,
        attribute: impl Into<String>,
        default: FloatValue,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            key: KeySource::Attribute {
                name: attribute.into(),
                fallback: None,
            },
            override_indicator: None,
            year_sensitive: false,
            default,
            unit: unit.into(),
        }
    }

    /// Key used when the entity lacks the attribute of an attribute-keyed requirement.
    pub fn with_fallback_key(mut self, key: impl Into<String>) -> Self {
        if let KeySource::Attribute { fallback, .. } = &mut self.key {
            *fallback = Some(key.into());
        }
        self
    }

    pub fn with_override(mut self, indicator: impl Into<String>) -> Self {
        self.override_indicator = Some(indicator.into());
        self
    }

    pub fn year_sensitive(mut self) -> Self {
        self.year_sensitive = true;
        self
    }

    fn registry_key<'a>(&'a self, context: &FactorContext<'a>) -> Option<&'a str> {
        match &self.key {
            KeySource::Fixed(key) => Some(key.as_str()),
            KeySource::Attribute { name, fallback } => context
                .attribute(name)
                .or(fallback.as_deref()),
        }
    }

    /// Resolve the factor through the override, registry and default tiers.
    pub fn resolve(
        &self,
        registry: &FactorRegistry,
        context: &FactorContext,
        override_value: Option<FloatValue>,
    ) -> ResolvedFactor {
        if let Some(value) = override_value {
            return ResolvedFactor {
                value,
                tier: FactorTier::Override,
            };
        }

        let year = if self.year_sensitive {
            context.year
        } else {
            None
        };
        let found = self
            .registry_key(context)
            .and_then(|key| registry.lookup(&self.category, key, year));

        match found {
            Some(entry) => ResolvedFactor {
                value: entry.value,
                tier: FactorTier::Registry,
            },
            None => {
                debug!(
                    "No registry entry for factor '{}' in {}; using default {}",
                    self.name, self.category, self.default
                );
                ResolvedFactor {
                    value: self.default,
                    tier: FactorTier::Default,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard_factors::categories::{CARBONATE, ELECTRICITY, GWP};

    fn attributes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn electricity() -> FactorRequirement {
        FactorRequirement::by_attribute("factor", ELECTRICITY, "region", 0.0005703, "tCO2/kWh")
            .with_override("emission_factor")
            .year_sensitive()
    }

    #[test]
    fn lookup_by_year() {
        let registry = FactorRegistry::new();
        let entry = registry.lookup(ELECTRICITY, "华北", Some(2022)).unwrap();
        assert_eq!(entry.value, 0.0006776);
        assert_eq!(entry.origin, FactorOrigin::BuiltIn);

        let older = registry.lookup(ELECTRICITY, "华北", Some(2012)).unwrap();
        assert_eq!(older.value, 0.0008843);

        // No year-agnostic grid factors exist
        assert!(registry.lookup(ELECTRICITY, "华北", Some(1999)).is_none());
        // Without a year the latest table is used
        assert_eq!(registry.lookup(ELECTRICITY, "华北", None).unwrap().year, Some(2022));
    }

    #[test]
    fn year_agnostic_entries_match_any_year() {
        let registry = FactorRegistry::new();
        assert_eq!(registry.lookup(GWP, "HFC-23", Some(2022)).unwrap().value, 11700.0);
        assert_eq!(registry.lookup(GWP, "HFC-23", None).unwrap().value, 11700.0);
    }

    #[test]
    fn register_is_append_only_and_readable_immediately() {
        let mut registry = FactorRegistry::new();
        let before = registry.len();
        let id = registry.register(CARBONATE, CustomFactor::new("slag", 0.21, "tCO2/t"));
        assert_eq!(registry.len(), before + 1);
        assert_eq!(registry.lookup(CARBONATE, "slag", None).unwrap().id, id);

        // A custom entry shadows the built-in while it exists
        let shadow = registry.register(CARBONATE, CustomFactor::new("CaCO3", 0.43, "tCO2/t"));
        assert_eq!(registry.lookup(CARBONATE, "CaCO3", None).unwrap().value, 0.43);
        assert!(registry.remove(shadow));
        assert_eq!(registry.lookup(CARBONATE, "CaCO3", None).unwrap().value, 0.440);
    }

    #[test]
    fn builtins_cannot_be_removed() {
        let mut registry = FactorRegistry::new();
        let builtin = registry.lookup(GWP, "CH4", None).unwrap().id;
        assert!(!registry.remove(builtin));
        assert!(!registry.remove(999_999));
        assert!(registry.lookup(GWP, "CH4", None).is_some());
    }

    #[test]
    fn custom_ids_do_not_collide_with_builtins() {
        let mut registry = FactorRegistry::new();
        let id = registry.register(GWP, CustomFactor::new("HFC-245fa", 1030.0, "tCO2e/t"));
        assert_eq!(registry.iter().filter(|e| e.id == id).count(), 1);
        assert_eq!(registry.custom_entries().count(), 1);
    }

    #[test]
    fn fallback_order() {
        let registry = FactorRegistry::new();
        let defaults = BTreeMap::new();

        // Nothing known: hardcoded default
        let none = attributes(&[]);
        let context = FactorContext {
            year: Some(2022),
            attributes: &none,
            defaults: &defaults,
        };
        let resolved = electricity().resolve(&registry, &context, None);
        assert_eq!(resolved.tier, FactorTier::Default);
        assert_eq!(resolved.value, 0.0005703);

        // Registry entry beats the default
        let north = attributes(&[("region", "华北")]);
        let context = FactorContext {
            year: Some(2022),
            attributes: &north,
            defaults: &defaults,
        };
        let resolved = electricity().resolve(&registry, &context, None);
        assert_eq!(resolved.tier, FactorTier::Registry);
        assert_eq!(resolved.value, 0.0006776);

        // Override beats both, including an override of zero
        let resolved = electricity().resolve(&registry, &context, Some(0.0));
        assert_eq!(resolved.tier, FactorTier::Override);
        assert_eq!(resolved.value, 0.0);
    }

    #[test]
    fn module_defaults_fill_missing_attributes() {
        let registry = FactorRegistry::new();
        let none = attributes(&[]);
        let defaults = attributes(&[("region", "南方")]);
        let context = FactorContext {
            year: Some(2022),
            attributes: &none,
            defaults: &defaults,
        };
        let resolved = electricity().resolve(&registry, &context, None);
        assert_eq!(resolved.value, 0.0004869);
    }

    #[test]
    fn attribute_fallback_key() {
        let registry = FactorRegistry::new();
        let none = attributes(&[]);
        let context = FactorContext {
            year: None,
            attributes: &none,
            defaults: &none,
        };
        let gwp = FactorRequirement::by_attribute("gwp", GWP, "gas", 1.0, "tCO2e/t")
            .with_fallback_key("CH4");
        assert_eq!(gwp.resolve(&registry, &context, None).value, 21.0);
    }

    #[test]
    fn empty_registry_uses_defaults() {
        let registry = FactorRegistry::empty();
        assert!(registry.is_empty());
        let north = attributes(&[("region", "华北")]);
        let context = FactorContext {
            year: Some(2022),
            attributes: &north,
            defaults: &north,
        };
        assert_eq!(
            electricity().resolve(&registry, &context, None).tier,
            FactorTier::Default
        );
    }
}
