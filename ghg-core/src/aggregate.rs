//! Entity and category aggregation.
//!
//! A [`CategoryTotal`] is the sum of the `emission` indicator over every entity of one
//! category. An industry combines its category totals according to each category's
//! [`AggregateRole`]:
//!
//! ```text
//! base_total  = Σ additive − Σ deduction
//! grand_total = base_total + Σ electricity/heat
//! ```
//!
//! Sums are taken at full precision in declaration order. Recomputing from the same
//! inputs always yields a value-equal result.

use crate::entity::Entity;
use crate::standard_indicators::IND_EMISSION;
use crate::timeseries::{FloatValue, MONTHS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Summed emission of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category_key: String,
    pub monthly_totals: [FloatValue; MONTHS],
    pub yearly_total: FloatValue,
}

impl CategoryTotal {
    pub fn zero(category_key: impl Into<String>) -> Self {
        Self {
            category_key: category_key.into(),
            monthly_totals: [0.0; MONTHS],
            yearly_total: 0.0,
        }
    }

    pub fn from_monthly(category_key: impl Into<String>, monthly_totals: [FloatValue; MONTHS]) -> Self {
        Self {
            category_key: category_key.into(),
            yearly_total: monthly_totals.iter().sum(),
            monthly_totals,
        }
    }

    /// Sum the emission series of `entities` month by month.
    pub fn sum<'a>(
        category_key: impl Into<String>,
        entities: impl IntoIterator<Item = &'a Arc<Entity>>,
    ) -> Self {
        let mut monthly = [0.0; MONTHS];
        for entity in entities {
            let values = entity.series.values(IND_EMISSION.key);
            for (total, value) in monthly.iter_mut().zip(values) {
                *total += value;
            }
        }
        Self::from_monthly(category_key, monthly)
    }
}

/// How a category contributes to its industry's totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateRole {
    /// A direct emission source
    #[default]
    Additive,
    /// Recovery, recycling or carbon fixed in products; subtracted from the sources
    Deduction,
    /// Indirect emissions from purchased electricity and heat
    ElectricityHeat,
}

/// What happens when deductions exceed the sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeductionPolicy {
    /// Totals may go negative
    #[default]
    AllowNegative,
    /// Base and grand totals are floored at zero
    ClampAtZero,
}

impl DeductionPolicy {
    fn apply(self, value: FloatValue) -> FloatValue {
        match self {
            DeductionPolicy::AllowNegative => value,
            DeductionPolicy::ClampAtZero => value.max(0.0),
        }
    }
}

/// Rolled-up totals of one industry; the only state an industry exposes upward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub industry: String,
    pub category_totals: BTreeMap<String, CategoryTotal>,
    pub additive_total: FloatValue,
    pub deduction_total: FloatValue,
    pub electricity_heat_total: FloatValue,
    pub base_total: FloatValue,
    pub grand_total: FloatValue,
}

impl AggregateSnapshot {
    pub fn empty(industry: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            category_totals: BTreeMap::new(),
            additive_total: 0.0,
            deduction_total: 0.0,
            electricity_heat_total: 0.0,
            base_total: 0.0,
            grand_total: 0.0,
        }
    }

    pub fn compute<'a>(
        industry: impl Into<String>,
        totals: impl IntoIterator<Item = (AggregateRole, &'a CategoryTotal)>,
        policy: DeductionPolicy,
    ) -> Self {
        let mut snapshot = Self::empty(industry);
        for (role, total) in totals {
            match role {
                AggregateRole::Additive => snapshot.additive_total += total.yearly_total,
                AggregateRole::Deduction => snapshot.deduction_total += total.yearly_total,
                AggregateRole::ElectricityHeat => {
                    snapshot.electricity_heat_total += total.yearly_total
                }
            }
            snapshot
                .category_totals
                .insert(total.category_key.clone(), total.clone());
        }
        snapshot.base_total = policy.apply(snapshot.additive_total - snapshot.deduction_total);
        snapshot.grand_total = policy.apply(snapshot.base_total + snapshot.electricity_heat_total);
        snapshot
    }

    pub fn category(&self, key: &str) -> Option<&CategoryTotal> {
        self.category_totals.get(key)
    }
}
