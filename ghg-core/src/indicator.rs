//! Indicator definitions.
//!
//! An indicator is a named monthly quantity owned by an entity (purchased electricity,
//! carbonate consumption, emission, ...). Definitions carry the canonical unit and the
//! [`IndicatorKind`], which decides whether users may edit the series and how an edit
//! is compared against the stored value.
//!
//! Built-in definitions are registered at compile time with [`define_static_indicator!`]
//! and collected through `inventory`; extra definitions can be registered at runtime on
//! [`INDICATOR_REGISTRY`].
//!
//! Indicator keys use `|` as a hierarchical separator. A key such as `production|line-2`
//! that has no definition of its own inherits the definition of `production`.

use crate::errors::{GhgError, GhgResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

/// Role an indicator plays within an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    /// Activity data entered by the user.
    Activity,
    /// Per-month replacement for a factor. An empty slot means "no override".
    Override,
    /// Computed from sibling indicators and factors; never edited directly.
    Derived,
}

impl IndicatorKind {
    pub fn is_editable(self) -> bool {
        !matches!(self, IndicatorKind::Derived)
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Activity => write!(f, "Activity"),
            IndicatorKind::Override => write!(f, "Override"),
            IndicatorKind::Derived => write!(f, "Derived"),
        }
    }
}

/// Definition of an indicator with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDefinition {
    /// Unique key (e.g. "purchased", "emission")
    pub key: String,
    /// Canonical unit
    pub unit: String,
    pub kind: IndicatorKind,
    pub description: String,
}

impl IndicatorDefinition {
    pub fn new(
        key: impl Into<String>,
        unit: impl Into<String>,
        kind: IndicatorKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            unit: unit.into(),
            kind,
            description: description.into(),
        }
    }
}

/// Static indicator definition holder for compile-time registration.
#[derive(Debug, Clone, Copy)]
pub struct StaticIndicatorDefinition {
    pub key: &'static str,
    pub unit: &'static str,
    pub kind: IndicatorKind,
    pub description: &'static str,
}

impl StaticIndicatorDefinition {
    pub const fn new(
        key: &'static str,
        unit: &'static str,
        kind: IndicatorKind,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            unit,
            kind,
            description,
        }
    }

    pub fn to_indicator_definition(&self) -> IndicatorDefinition {
        IndicatorDefinition::new(self.key, self.unit, self.kind, self.description)
    }
}

inventory::collect!(StaticIndicatorDefinition);

/// Macro for defining indicators at compile time.
///
/// ```rust
/// use ghg_core::define_static_indicator;
/// use ghg_core::indicator::IndicatorKind;
///
/// define_static_indicator!(
///     IND_STEAM,
///     key = "steam",
///     unit = "GJ",
///     kind = IndicatorKind::Activity,
///     description = "Steam consumed",
/// );
///
/// assert_eq!(IND_STEAM.key, "steam");
/// ```
#[macro_export]
macro_rules! define_static_indicator {
    (
        $var_name:ident,
        key = $key:expr,
        unit = $unit:expr,
        kind = $kind:expr,
        description = $desc:expr $(,)?
    ) => {
        #[doc = concat!("Static indicator definition for ", $key)]
        pub static $var_name: $crate::indicator::StaticIndicatorDefinition =
            $crate::indicator::StaticIndicatorDefinition::new($key, $unit, $kind, $desc);

        $crate::inventory::submit! { $var_name }
    };
}

pub use crate::define_static_indicator;

/// Registry for indicator definitions.
///
/// Static definitions come from `inventory`; runtime definitions live behind a `RwLock`.
pub struct IndicatorRegistry {
    runtime: RwLock<HashMap<String, Arc<IndicatorDefinition>>>,
}

impl IndicatorRegistry {
    pub fn new() -> Self {
        Self {
            runtime: RwLock::new(HashMap::new()),
        }
    }

    fn get_exact(&self, key: &str) -> Option<IndicatorDefinition> {
        for definition in inventory::iter::<StaticIndicatorDefinition> {
            if definition.key == key {
                return Some(definition.to_indicator_definition());
            }
        }

        let runtime = self.runtime.read().unwrap_or_else(PoisonError::into_inner);
        runtime.get(key).map(|definition| (**definition).clone())
    }

    /// Look up a definition, falling back to the parent of a `|`-separated key.
    pub fn get(&self, key: &str) -> Option<IndicatorDefinition> {
        self.get_exact(key).or_else(|| {
            key.split_once('|')
                .and_then(|(parent, _)| self.get_exact(parent))
                .map(|parent| IndicatorDefinition { key: key.to_string(), ..parent })
        })
    }

    /// Unit of an indicator, or an empty string when it is not registered.
    pub fn unit_of(&self, key: &str) -> String {
        self.get(key).map(|d| d.unit).unwrap_or_default()
    }

    /// Register a definition at runtime.
    ///
    /// Fails if the key is already defined, statically or at runtime.
    pub fn register(&self, definition: IndicatorDefinition) -> GhgResult<()> {
        if inventory::iter::<StaticIndicatorDefinition>
            .into_iter()
            .any(|d| d.key == definition.key)
        {
            return Err(GhgError::DuplicateIndicator(definition.key));
        }

        let mut runtime = self.runtime.write().unwrap_or_else(PoisonError::into_inner);
        if runtime.contains_key(&definition.key) {
            return Err(GhgError::DuplicateIndicator(definition.key));
        }
        runtime.insert(definition.key.clone(), Arc::new(definition));
        Ok(())
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.get_exact(key).is_some()
    }

    /// All definitions sorted by key.
    pub fn list(&self) -> Vec<IndicatorDefinition> {
        let mut result: Vec<IndicatorDefinition> = inventory::iter::<StaticIndicatorDefinition>
            .into_iter()
            .map(StaticIndicatorDefinition::to_indicator_definition)
            .collect();

        let runtime = self.runtime.read().unwrap_or_else(PoisonError::into_inner);
        result.extend(runtime.values().map(|d| (**d).clone()));
        result.sort_by(|a, b| a.key.cmp(&b.key));
        result
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global indicator registry.
pub static INDICATOR_REGISTRY: LazyLock<IndicatorRegistry> = LazyLock::new(IndicatorRegistry::new);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard_indicators::{IND_EMISSION, IND_PRODUCTION, IND_PURCHASED};

    #[test]
    fn static_definitions_are_registered() {
        let definition = INDICATOR_REGISTRY.get(IND_PURCHASED.key).unwrap();
        assert_eq!(definition.kind, IndicatorKind::Activity);
        assert_eq!(definition.unit, IND_PURCHASED.unit);

        let emission = INDICATOR_REGISTRY.get(IND_EMISSION.key).unwrap();
        assert!(!emission.kind.is_editable());
    }

    #[test]
    fn hierarchical_keys_inherit_parent() {
        let line = INDICATOR_REGISTRY.get("production|line-2").unwrap();
        assert_eq!(line.key, "production|line-2");
        assert_eq!(line.unit, IND_PRODUCTION.unit);
        assert!(!INDICATOR_REGISTRY.is_registered("production|line-2"));
    }

    #[test]
    fn runtime_registration_rejects_duplicates() {
        let registry = IndicatorRegistry::new();
        registry
            .register(IndicatorDefinition::new(
                "test|steam",
                "GJ",
                IndicatorKind::Activity,
                "Steam consumed",
            ))
            .unwrap();
        assert_eq!(registry.unit_of("test|steam"), "GJ");

        let again = registry.register(IndicatorDefinition::new(
            "test|steam",
            "GJ",
            IndicatorKind::Activity,
            "",
        ));
        assert!(matches!(again, Err(GhgError::DuplicateIndicator(_))));

        let clash = registry.register(IndicatorDefinition::new(
            IND_PURCHASED.key,
            "MWh",
            IndicatorKind::Activity,
            "",
        ));
        assert!(clash.is_err());
    }

    #[test]
    fn unknown_indicator_has_no_unit() {
        assert_eq!(INDICATOR_REGISTRY.unit_of("no such indicator"), "");
    }
}
