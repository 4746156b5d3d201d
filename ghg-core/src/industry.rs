//! Industry containers.
//!
//! An [`Industry`] owns the category modules of one sector and the middle edge of the
//! propagation tree: it folds changed category totals into an [`AggregateSnapshot`] and
//! passes the snapshot upward only when it differs by value.

use crate::aggregate::{AggregateSnapshot, CategoryTotal, DeductionPolicy};
use crate::errors::{GhgError, GhgResult};
use crate::module::CategoryModule;
use crate::propagation::{CommitGuard, Notification};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Industry {
    key: String,
    name: String,
    policy: DeductionPolicy,
    modules: Vec<CategoryModule>,
    guard: CommitGuard<Arc<AggregateSnapshot>>,
}

impl Industry {
    /// Build an industry from its category modules.
    ///
    /// Category keys must be unique within the industry.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        modules: Vec<CategoryModule>,
        policy: DeductionPolicy,
    ) -> GhgResult<Self> {
        let key = key.into();
        for (i, module) in modules.iter().enumerate() {
            if modules[..i].iter().any(|m| m.key() == module.key()) {
                return Err(GhgError::DuplicateCategory {
                    industry: key,
                    category: module.key().to_string(),
                });
            }
        }

        let baseline = Arc::new(Self::compute(&key, &modules, policy));
        Ok(Self {
            guard: CommitGuard::new(format!("industry:{}", key), baseline),
            name: name.into(),
            policy,
            modules,
            key,
        })
    }

    fn compute(key: &str, modules: &[CategoryModule], policy: DeductionPolicy) -> AggregateSnapshot {
        AggregateSnapshot::compute(
            key,
            modules.iter().map(|m| (m.role(), m.total())),
            policy,
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modules(&self) -> &[CategoryModule] {
        &self.modules
    }

    pub fn module(&self, category: &str) -> Option<&CategoryModule> {
        self.modules.iter().find(|m| m.key() == category)
    }

    pub fn module_mut(&mut self, category: &str) -> Option<&mut CategoryModule> {
        self.modules.iter_mut().find(|m| m.key() == category)
    }

    pub fn modules_mut(&mut self) -> impl Iterator<Item = &mut CategoryModule> {
        self.modules.iter_mut()
    }

    /// Category holding `entity_id`, if any.
    pub fn find_entity(&self, entity_id: &str) -> Option<&CategoryModule> {
        self.modules.iter().find(|m| m.contains(entity_id))
    }

    /// The last committed snapshot.
    pub fn snapshot(&self) -> &Arc<AggregateSnapshot> {
        self.guard.committed()
    }

    pub fn guard(&self) -> &CommitGuard<Arc<AggregateSnapshot>> {
        &self.guard
    }

    /// Fold changed category totals into the aggregate.
    ///
    /// Returns one notification per changed category followed by the new snapshot if the
    /// aggregate changed by value.
    pub fn absorb(&mut self, changed: Vec<CategoryTotal>) -> Vec<Notification> {
        if changed.is_empty() {
            return Vec::new();
        }
        let mut notifications: Vec<Notification> = changed
            .into_iter()
            .map(|total| Notification::CategoryTotal {
                industry: self.key.clone(),
                total,
            })
            .collect();

        self.guard.mark_dirty();
        let candidate = Arc::new(Self::compute(&self.key, &self.modules, self.policy));
        if let Some(snapshot) = self.guard.commit(candidate) {
            notifications.push(Notification::Aggregate(snapshot));
        }
        notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateRole;
    use crate::entity::EntitySeed;
    use crate::example_components::ScaledActivity;
    use crate::factors::FactorRegistry;
    use crate::formula::{FormulaChain, F};
    use crate::propagation::EdgeState;

    fn module(key: &str, role: AggregateRole, value: f64) -> CategoryModule {
        let chain =
            FormulaChain::build(key, vec![Arc::new(ScaledActivity::new("activity")) as F]).unwrap();
        CategoryModule::new(key, key, role, chain).with_seeds(
            &[EntitySeed::new(format!("{}-1", key), key).with_value("activity", 1, value)],
            &FactorRegistry::empty(),
        )
    }

    fn industry() -> Industry {
        Industry::new(
            "test",
            "Test",
            vec![
                module("source", AggregateRole::Additive, 10.0),
                module("recovery", AggregateRole::Deduction, 4.0),
                module("electricity", AggregateRole::ElectricityHeat, 1.0),
            ],
            DeductionPolicy::AllowNegative,
        )
        .unwrap()
    }

    #[test]
    fn baseline_snapshot() {
        let industry = industry();
        assert_eq!(industry.snapshot().base_total, 6.0);
        assert_eq!(industry.snapshot().grand_total, 7.0);
        assert_eq!(industry.find_entity("recovery-1").unwrap().key(), "recovery");
    }

    #[test]
    fn duplicate_categories_are_rejected() {
        let result = Industry::new(
            "test",
            "Test",
            vec![
                module("a", AggregateRole::Additive, 1.0),
                module("a", AggregateRole::Additive, 1.0),
            ],
            DeductionPolicy::AllowNegative,
        );
        assert!(matches!(result, Err(GhgError::DuplicateCategory { .. })));
    }

    #[test]
    fn absorb_notifies_category_then_aggregate() {
        let registry = FactorRegistry::empty();
        let mut industry = industry();
        let changed = industry
            .module_mut("source")
            .unwrap()
            .set_value("source-1", "activity", 2, 5.0.into(), &registry);
        let notifications = industry.absorb(changed.into_iter().collect());

        assert_eq!(notifications.len(), 2);
        assert!(matches!(notifications[0], Notification::CategoryTotal { .. }));
        match &notifications[1] {
            Notification::Aggregate(snapshot) => assert_eq!(snapshot.grand_total, 12.0),
            other => panic!("unexpected notification {:?}", other),
        }
        assert_eq!(industry.guard().state(), EdgeState::Idle);
    }

    #[test]
    fn nothing_changed_nothing_notified() {
        let mut industry = industry();
        assert!(industry.absorb(Vec::new()).is_empty());
    }
}
