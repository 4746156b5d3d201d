//! The enterprise ledger.
//!
//! A [`Ledger`] is the root of the aggregation tree and the whole input surface: it owns
//! the factor registry and the industries, routes every edit to the category module
//! holding the entity, and hands the notifications that come back up to the registered
//! observers. Every operation returns the current [`EnterpriseSnapshot`]; invalid
//! operations leave it untouched.

use crate::aggregate::{AggregateSnapshot, CategoryTotal};
use crate::entity::{Entity, EntitySeed};
use crate::errors::{GhgError, GhgResult};
use crate::factors::{CustomFactor, FactorId, FactorRegistry};
use crate::industry::Industry;
use crate::module::CategoryModule;
use crate::propagation::{ChangeObserver, CommitGuard, Notification};
use crate::timeseries::{format_value, FloatValue, MonthMetadata, RawValue};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Totals of every industry of the enterprise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterpriseSnapshot {
    pub industries: BTreeMap<String, Arc<AggregateSnapshot>>,
    pub base_total: FloatValue,
    pub grand_total: FloatValue,
}

impl EnterpriseSnapshot {
    fn compute(industries: &[Industry]) -> Self {
        let mut snapshot = Self {
            industries: BTreeMap::new(),
            base_total: 0.0,
            grand_total: 0.0,
        };
        for industry in industries {
            let aggregate = industry.snapshot();
            snapshot.base_total += aggregate.base_total;
            snapshot.grand_total += aggregate.grand_total;
            snapshot
                .industries
                .insert(industry.key().to_string(), Arc::clone(aggregate));
        }
        snapshot
    }

    pub fn industry(&self, key: &str) -> Option<&AggregateSnapshot> {
        self.industries.get(key).map(Arc::as_ref)
    }
}

pub struct Ledger {
    registry: FactorRegistry,
    industries: Vec<Industry>,
    display_decimals: usize,
    /// Entity id to (industry position, category key)
    index: HashMap<String, (usize, String)>,
    guard: CommitGuard<Arc<EnterpriseSnapshot>>,
    observers: Vec<Box<dyn ChangeObserver>>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("industries", &self.industries)
            .field("display_decimals", &self.display_decimals)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Assemble a ledger.
    ///
    /// Industry keys and entity ids must be unique across the whole ledger.
    pub fn new(
        registry: FactorRegistry,
        industries: Vec<Industry>,
        display_decimals: usize,
    ) -> GhgResult<Self> {
        let mut index = HashMap::new();
        for (position, industry) in industries.iter().enumerate() {
            if industries[..position].iter().any(|i| i.key() == industry.key()) {
                return Err(GhgError::DuplicateIndustry(industry.key().to_string()));
            }
            for module in industry.modules() {
                for entity in module.entities().iter() {
                    let previous = index.insert(
                        entity.id.as_str().to_string(),
                        (position, module.key().to_string()),
                    );
                    if previous.is_some() {
                        return Err(GhgError::DuplicateEntity(entity.id.to_string()));
                    }
                }
            }
        }

        let baseline = Arc::new(EnterpriseSnapshot::compute(&industries));
        Ok(Self {
            registry,
            industries,
            display_decimals,
            index,
            guard: CommitGuard::new("enterprise", baseline),
            observers: Vec::new(),
        })
    }

    pub fn registry(&self) -> &FactorRegistry {
        &self.registry
    }

    pub fn industries(&self) -> &[Industry] {
        &self.industries
    }

    pub fn industry(&self, key: &str) -> Option<&Industry> {
        self.industries.iter().find(|i| i.key() == key)
    }

    pub fn entity(&self, entity_id: &str) -> Option<&Arc<Entity>> {
        let (position, category) = self.index.get(entity_id)?;
        self.industries[*position].module(category)?.entity(entity_id)
    }

    pub fn category_total(&self, industry: &str, category: &str) -> Option<&CategoryTotal> {
        self.industry(industry)?.module(category).map(|m| m.total())
    }

    pub fn snapshot(&self) -> Arc<EnterpriseSnapshot> {
        Arc::clone(self.guard.committed())
    }

    pub fn guard(&self) -> &CommitGuard<Arc<EnterpriseSnapshot>> {
        &self.guard
    }

    /// Fixed-decimal rendering at the configured precision.
    pub fn format(&self, value: FloatValue) -> String {
        format_value(value, self.display_decimals)
    }

    pub fn subscribe(&mut self, observer: impl ChangeObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn propagate(&mut self, changes: Vec<(usize, Vec<CategoryTotal>)>) -> Arc<EnterpriseSnapshot> {
        let mut notifications = Vec::new();
        for (position, changed) in changes {
            notifications.extend(self.industries[position].absorb(changed));
        }

        if notifications
            .iter()
            .any(|n| matches!(n, Notification::Aggregate(_)))
        {
            self.guard.mark_dirty();
            let candidate = Arc::new(EnterpriseSnapshot::compute(&self.industries));
            if let Some(snapshot) = self.guard.commit(candidate) {
                notifications.push(Notification::Enterprise(snapshot));
            }
        }

        for notification in &notifications {
            for observer in self.observers.iter_mut() {
                observer.notify(notification);
            }
        }
        self.snapshot()
    }

    /// Set one month of an activity or override indicator.
    pub fn set_value(
        &mut self,
        entity_id: &str,
        indicator: &str,
        month: u8,
        raw: impl Into<RawValue>,
    ) -> Arc<EnterpriseSnapshot> {
        let Some((position, category)) = self.index.get(entity_id).cloned() else {
            warn!("Unknown entity '{}'; edit of {} ignored", entity_id, indicator);
            return self.snapshot();
        };
        let changed = self.industries[position]
            .module_mut(&category)
            .and_then(|m| m.set_value(entity_id, indicator, month, raw.into(), &self.registry));
        self.propagate(vec![(position, changed.into_iter().collect())])
    }

    pub fn add_entity(
        &mut self,
        industry: &str,
        category: &str,
        seed: EntitySeed,
    ) -> Arc<EnterpriseSnapshot> {
        if !seed.is_valid() {
            warn!("Entity without an id cannot be added");
            return self.snapshot();
        }
        if self.index.contains_key(&seed.id) {
            warn!("Entity '{}' already exists; not added", seed.id);
            return self.snapshot();
        }
        let Some(position) = self.industries.iter().position(|i| i.key() == industry) else {
            warn!("Unknown industry '{}'; entity '{}' not added", industry, seed.id);
            return self.snapshot();
        };
        let Some(module) = self.industries[position].module_mut(category) else {
            warn!(
                "Unknown category '{}' in {}; entity '{}' not added",
                category, industry, seed.id
            );
            return self.snapshot();
        };

        let changed = module.add_entity(&seed, &self.registry);
        if module.contains(&seed.id) {
            self.index.insert(seed.id, (position, category.to_string()));
        }
        self.propagate(vec![(position, changed.into_iter().collect())])
    }

    pub fn remove_entity(&mut self, entity_id: &str) -> Arc<EnterpriseSnapshot> {
        let Some((position, category)) = self.index.get(entity_id).cloned() else {
            warn!("Unknown entity '{}'; not removed", entity_id);
            return self.snapshot();
        };
        let Some(module) = self.industries[position].module_mut(&category) else {
            return self.snapshot();
        };
        let changed = module.remove_entity(entity_id);
        if !module.contains(entity_id) {
            self.index.remove(entity_id);
        }
        self.propagate(vec![(position, changed.into_iter().collect())])
    }

    /// Update descriptive fields of a month slot. Totals are not affected.
    pub fn set_month_metadata(
        &mut self,
        entity_id: &str,
        indicator: &str,
        month: u8,
        metadata: MonthMetadata,
    ) -> Arc<EnterpriseSnapshot> {
        match self.module_of(entity_id) {
            Some(module) => {
                module.set_month_metadata(entity_id, indicator, month, metadata);
            }
            None => warn!("Unknown entity '{}'; metadata ignored", entity_id),
        }
        self.snapshot()
    }

    pub fn clear_material(
        &mut self,
        entity_id: &str,
        indicator: &str,
        month: u8,
    ) -> Arc<EnterpriseSnapshot> {
        match self.module_of(entity_id) {
            Some(module) => {
                module.clear_material(entity_id, indicator, month);
            }
            None => warn!("Unknown entity '{}'; nothing cleared", entity_id),
        }
        self.snapshot()
    }

    fn module_of(&mut self, entity_id: &str) -> Option<&mut CategoryModule> {
        let (position, category) = self.index.get(entity_id)?;
        self.industries[*position].module_mut(category)
    }

    /// Add a user-defined factor and re-evaluate every entity against it.
    pub fn register_custom_factor(
        &mut self,
        category: &str,
        factor: CustomFactor,
    ) -> (FactorId, Arc<EnterpriseSnapshot>) {
        let id = self.registry.register(category, factor);
        (id, self.refresh())
    }

    /// Remove a user-defined factor. Built-in factors cannot be removed.
    pub fn remove_custom_factor(&mut self, id: FactorId) -> Arc<EnterpriseSnapshot> {
        if !self.registry.remove(id) {
            return self.snapshot();
        }
        self.refresh()
    }

    fn refresh(&mut self) -> Arc<EnterpriseSnapshot> {
        let registry = &self.registry;
        let changes: Vec<(usize, Vec<CategoryTotal>)> = self
            .industries
            .iter_mut()
            .enumerate()
            .map(|(position, industry)| {
                let changed = industry
                    .modules_mut()
                    .filter_map(|module| module.refresh(registry))
                    .collect();
                (position, changed)
            })
            .collect();
        self.propagate(changes)
    }
}
