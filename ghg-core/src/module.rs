//! Category modules.
//!
//! A [`CategoryModule`] is one emission category of an industry (purchased electricity,
//! carbonate decomposition, HFC-23 by-product, ...). It owns the entity arena of that
//! category, the formula chain every entity is evaluated with, and the leaf edge of the
//! propagation tree.
//!
//! Edits run to completion synchronously: the touched entity is re-evaluated, the
//! category total is recomputed, and the new total is returned only if it differs by
//! value from the last committed one. Invalid edits are ignored and logged.

use crate::aggregate::{AggregateRole, CategoryTotal};
use crate::collection::{IndicatorCollection, IndicatorItem};
use crate::entity::{Entity, EntityArena, EntityId, EntitySeed};
use crate::factors::FactorRegistry;
use crate::formula::FormulaChain;
use crate::indicator::IndicatorKind;
use crate::propagation::CommitGuard;
use crate::timeseries::{Month, MonthMetadata, RawValue};
use log::{info, trace, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CategoryModule {
    key: String,
    name: String,
    role: AggregateRole,
    chain: FormulaChain,
    layout: Vec<(String, IndicatorKind)>,
    /// Attribute values used when an entity does not carry its own
    defaults: BTreeMap<String, String>,
    year: Option<u16>,
    entities: EntityArena,
    guard: CommitGuard<CategoryTotal>,
}

impl CategoryModule {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        role: AggregateRole,
        chain: FormulaChain,
    ) -> Self {
        let key = key.into();
        let layout = chain.indicator_layout();
        Self {
            guard: CommitGuard::new(format!("category:{}", key), CategoryTotal::zero(&key)),
            name: name.into(),
            role,
            chain,
            layout,
            defaults: BTreeMap::new(),
            year: None,
            entities: EntityArena::new(),
            key,
        }
    }

    pub fn with_defaults(mut self, defaults: BTreeMap<String, String>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_year(mut self, year: Option<u16>) -> Self {
        self.year = year;
        self
    }

    /// Add the initial entities without notifying anyone.
    ///
    /// The resulting total becomes the committed baseline.
    pub fn with_seeds(mut self, seeds: &[EntitySeed], registry: &FactorRegistry) -> Self {
        for seed in seeds {
            self.insert(seed, registry);
        }
        let baseline = self.compute_total();
        self.guard = CommitGuard::new(format!("category:{}", self.key), baseline);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> AggregateRole {
        self.role
    }

    pub fn chain(&self) -> &FormulaChain {
        &self.chain
    }

    pub fn layout(&self) -> &[(String, IndicatorKind)] {
        &self.layout
    }

    pub fn entities(&self) -> &EntityArena {
        &self.entities
    }

    pub fn entity(&self, id: &str) -> Option<&Arc<Entity>> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains(id)
    }

    /// The last committed total.
    pub fn total(&self) -> &CategoryTotal {
        self.guard.committed()
    }

    pub fn guard(&self) -> &CommitGuard<CategoryTotal> {
        &self.guard
    }

    fn compute_total(&self) -> CategoryTotal {
        CategoryTotal::sum(&self.key, self.entities.iter())
    }

    fn commit(&mut self) -> Option<CategoryTotal> {
        let total = self.compute_total();
        self.guard.commit(total)
    }

    /// Entity with its derived indicators recomputed, or `None` if none of them changed.
    fn evaluate(&self, entity: &Entity, registry: &FactorRegistry) -> Option<Entity> {
        let derived = self
            .chain
            .evaluate(entity, registry, self.year, &self.defaults);
        let mut series = entity.series.clone();
        let mut changed = false;
        for (key, values) in derived {
            if let Some(updated) = series.with_item(&key, |item| item.with_values(values)) {
                series = updated;
                changed = true;
            }
        }
        changed.then(|| Entity {
            series,
            ..entity.clone()
        })
    }

    fn build_entity(&self, seed: &EntitySeed, registry: &FactorRegistry) -> Entity {
        let mut series = IndicatorCollection::new();
        for (key, kind) in &self.layout {
            series.add_series(key, *kind);
        }

        for value in &seed.values {
            let Some(month) = Month::new(value.month) else {
                warn!(
                    "Seed '{}' sets {} for month {}; ignored",
                    seed.id, value.indicator, value.month
                );
                continue;
            };
            if !self.is_editable(&value.indicator) {
                warn!(
                    "Seed '{}' sets '{}', which is not an input of {}; ignored",
                    seed.id, value.indicator, self.key
                );
                continue;
            }
            if let Some(updated) =
                series.with_item(&value.indicator, |item| item.with_raw(month, value.value.clone()))
            {
                series = updated;
            }
        }

        let entity = Entity {
            id: EntityId::new(seed.id.clone()),
            name: seed.name.clone(),
            attributes: seed.attributes.clone(),
            removable: seed.removable,
            series,
        };
        self.evaluate(&entity, registry).unwrap_or(entity)
    }

    fn is_editable(&self, key: &str) -> bool {
        self.layout
            .iter()
            .any(|(k, kind)| k == key && kind.is_editable())
    }

    fn insert(&mut self, seed: &EntitySeed, registry: &FactorRegistry) -> bool {
        if !seed.is_valid() {
            warn!("Entity without an id cannot be added to {}", self.key);
            return false;
        }
        let entity = self.build_entity(seed, registry);
        match self.entities.insert(entity) {
            Some(entities) => {
                self.entities = entities;
                info!("Added entity '{}' to {}", seed.id, self.key);
                true
            }
            None => {
                warn!("Entity '{}' already exists in {}; not added", seed.id, self.key);
                false
            }
        }
    }

    /// Set one month of an activity or override indicator.
    pub fn set_value(
        &mut self,
        entity_id: &str,
        indicator: &str,
        month: u8,
        raw: RawValue,
        registry: &FactorRegistry,
    ) -> Option<CategoryTotal> {
        let Some(month) = Month::new(month) else {
            warn!("Month {} is out of range; edit of {} ignored", month, indicator);
            return None;
        };
        let Some(entity) = self.entities.get(entity_id).cloned() else {
            warn!("Unknown entity '{}' in {}; edit ignored", entity_id, self.key);
            return None;
        };
        if !self.is_editable(indicator) {
            warn!(
                "'{}' is not an editable indicator of {}; edit ignored",
                indicator, self.key
            );
            return None;
        }

        let Some(series) = entity
            .series
            .with_item(indicator, |item| item.with_raw(month, raw))
        else {
            trace!(
                "{}/{}/{} unchanged; nothing to recompute",
                entity_id,
                indicator,
                month
            );
            return None;
        };

        self.guard.mark_dirty();
        let edited = Entity {
            series,
            ..(*entity).clone()
        };
        let updated = self.evaluate(&edited, registry).unwrap_or(edited);
        if let Some(entities) = self.entities.update_entity(entity_id, |_| Some(updated)) {
            self.entities = entities;
        }
        self.commit()
    }

    pub fn add_entity(&mut self, seed: &EntitySeed, registry: &FactorRegistry) -> Option<CategoryTotal> {
        if !self.insert(seed, registry) {
            return None;
        }
        self.guard.mark_dirty();
        self.commit()
    }

    pub fn remove_entity(&mut self, entity_id: &str) -> Option<CategoryTotal> {
        let Some(entity) = self.entities.get(entity_id) else {
            warn!("Unknown entity '{}' in {}; not removed", entity_id, self.key);
            return None;
        };
        if !entity.removable {
            warn!("Entity '{}' is pinned and cannot be removed", entity_id);
            return None;
        }
        let entities = self.entities.remove(entity_id)?;
        self.entities = entities;
        info!("Removed entity '{}' from {}", entity_id, self.key);
        self.guard.mark_dirty();
        self.commit()
    }

    /// Update descriptive fields of a month slot. Never recomputes.
    ///
    /// Returns whether an entity was updated.
    pub fn set_month_metadata(
        &mut self,
        entity_id: &str,
        indicator: &str,
        month: u8,
        metadata: MonthMetadata,
    ) -> bool {
        let Some(month) = Month::new(month) else {
            warn!("Month {} is out of range; metadata ignored", month);
            return false;
        };
        self.update_series(entity_id, |series| {
            series.with_metadata(indicator, month, metadata)
        })
    }

    pub fn clear_material(&mut self, entity_id: &str, indicator: &str, month: u8) -> bool {
        let Some(month) = Month::new(month) else {
            warn!("Month {} is out of range; nothing cleared", month);
            return false;
        };
        self.update_series(entity_id, |series| {
            series.with_item(indicator, |item| {
                item.series.slot(month).material.as_ref()?;
                Some(IndicatorItem {
                    series: item.series.without_material(month),
                    ..item.clone()
                })
            })
        })
    }

    fn update_series<F>(&mut self, entity_id: &str, f: F) -> bool
    where
        F: FnOnce(&IndicatorCollection) -> Option<IndicatorCollection>,
    {
        let updated = self.entities.update_entity(entity_id, |entity| {
            Some(Entity {
                series: f(&entity.series)?,
                ..entity.clone()
            })
        });
        match updated {
            Some(entities) => {
                self.entities = entities;
                true
            }
            None => {
                warn!("Nothing to update for '{}' in {}", entity_id, self.key);
                false
            }
        }
    }

    /// Re-evaluate every entity, e.g. after the factor registry changed.
    pub fn refresh(&mut self, registry: &FactorRegistry) -> Option<CategoryTotal> {
        let ids: Vec<EntityId> = self.entities.iter().map(|e| e.id.clone()).collect();
        let mut changed = false;
        for id in ids {
            let Some(entity) = self.entities.get(id.as_str()).cloned() else {
                continue;
            };
            if let Some(updated) = self.evaluate(&entity, registry) {
                if let Some(entities) = self.entities.update_entity(id.as_str(), |_| Some(updated)) {
                    self.entities = entities;
                    changed = true;
                }
            }
        }
        if !changed {
            return None;
        }
        self.guard.mark_dirty();
        self.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example_components::{DoubleActivity, ScaledActivity};
    use crate::formula::F;
    use crate::propagation::EdgeState;

    fn module() -> CategoryModule {
        let chain = FormulaChain::build(
            "scaled",
            vec![Arc::new(DoubleActivity) as F, Arc::new(ScaledActivity::new("doubled")) as F],
        )
        .unwrap();
        CategoryModule::new("scaled", "Scaled", AggregateRole::Additive, chain).with_seeds(
            &[EntitySeed::new("a", "A").pinned().with_value("activity", 1, 5.0)],
            &FactorRegistry::empty(),
        )
    }

    #[test]
    fn seeds_set_the_baseline_silently() {
        let module = module();
        assert_eq!(module.total().yearly_total, 10.0);
        assert_eq!(module.guard().state(), EdgeState::Idle);
    }

    #[test]
    fn edit_recomputes_dependent_chain() {
        let registry = FactorRegistry::empty();
        let mut module = module();
        let total = module.set_value("a", "activity", 2, "2.5".into(), &registry).unwrap();
        assert_eq!(total.monthly_totals[1], 5.0);
        assert_eq!(total.yearly_total, 15.0);
        assert_eq!(module.guard().state(), EdgeState::Idle);

        let entity = module.entity("a").unwrap();
        assert_eq!(entity.series.values("doubled")[1], 5.0);
    }

    #[test]
    fn same_value_is_a_noop() {
        let registry = FactorRegistry::empty();
        let mut module = module();
        let before = module.entities().clone();
        assert!(module.set_value("a", "activity", 1, "5".into(), &registry).is_none());
        assert!(Arc::ptr_eq(before.get("a").unwrap(), module.entity("a").unwrap()));
    }

    #[test]
    fn override_of_zero_zeroes_emission() {
        let registry = FactorRegistry::empty();
        let mut module = module();
        let total = module
            .set_value("a", "emission_factor", 1, "0".into(), &registry)
            .unwrap();
        assert_eq!(total.yearly_total, 0.0);
        // Clearing the override restores the default factor
        let total = module
            .set_value("a", "emission_factor", 1, RawValue::empty(), &registry)
            .unwrap();
        assert_eq!(total.yearly_total, 10.0);
    }

    #[test]
    fn invalid_edits_are_ignored() {
        let registry = FactorRegistry::empty();
        let mut module = module();
        assert!(module.set_value("a", "emission", 1, 3.0.into(), &registry).is_none());
        assert!(module.set_value("a", "doubled", 1, 3.0.into(), &registry).is_none());
        assert!(module.set_value("a", "activity", 13, 3.0.into(), &registry).is_none());
        assert!(module.set_value("zzz", "activity", 1, 3.0.into(), &registry).is_none());
        assert!(module.set_value("a", "unknown", 1, 3.0.into(), &registry).is_none());
        assert_eq!(module.total().yearly_total, 10.0);
    }

    #[test]
    fn add_and_remove_entities() {
        let registry = FactorRegistry::empty();
        let mut module = module();

        // An empty entity leaves the total unchanged
        assert!(module.add_entity(&EntitySeed::new("b", "B"), &registry).is_none());
        assert!(module.contains("b"));
        assert!(module.add_entity(&EntitySeed::new("b", "B"), &registry).is_none());
        assert_eq!(module.entities().len(), 2);

        let seed = EntitySeed::new("c", "C").with_value("activity", 3, 1.0);
        assert_eq!(module.add_entity(&seed, &registry).unwrap().yearly_total, 12.0);
        assert_eq!(module.remove_entity("c").unwrap().yearly_total, 10.0);

        // Pinned seed
        assert!(module.remove_entity("a").is_none());
        assert!(module.contains("a"));
        assert!(module.add_entity(&EntitySeed::new(" ", "blank"), &registry).is_none());
    }

    #[test]
    fn metadata_does_not_notify() {
        let mut module = module();
        let metadata = MonthMetadata {
            data_source: Some("meter reading".to_string()),
            ..Default::default()
        };
        assert!(module.set_month_metadata("a", "activity", 1, metadata));
        assert_eq!(module.guard().state(), EdgeState::Idle);
        let slot = module.entity("a").unwrap().series.get_series("activity").unwrap().slot(
            Month::new(1).unwrap(),
        );
        assert_eq!(slot.data_source.as_deref(), Some("meter reading"));
        // Nothing attached, nothing to clear
        assert!(!module.clear_material("a", "activity", 1));
    }

    #[test]
    fn refresh_with_unchanged_factors_is_silent() {
        let mut module = module();
        assert!(module.refresh(&FactorRegistry::empty()).is_none());
    }
}
