//! Entities and the copy-on-write entity arena.
//!
//! An entity is a process, device, product or gas record: the unit that owns indicator
//! series. A category module keeps its entities in an [`EntityArena`] keyed by id.
//! Every edit yields a new arena in which only the touched entity is a new allocation,
//! so earlier snapshots stay valid and untouched siblings remain shared.

use crate::collection::IndicatorCollection;
use crate::timeseries::RawValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    /// Static attributes such as region, fuel type, material or device type
    pub attributes: BTreeMap<String, String>,
    /// Seed entities may be pinned so they cannot be deleted
    pub removable: bool,
    pub series: IndicatorCollection,
}

impl Entity {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// A single initial value carried by a seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedValue {
    pub indicator: String,
    pub month: u8,
    pub value: RawValue,
}

/// Everything needed to create an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySeed {
    pub id: String,
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub removable: bool,
    pub values: Vec<SeedValue>,
}

impl Default for EntitySeed {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            attributes: BTreeMap::new(),
            removable: true,
            values: Vec::new(),
        }
    }
}

impl EntitySeed {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn pinned(mut self) -> Self {
        self.removable = false;
        self
    }

    pub fn with_value(
        mut self,
        indicator: impl Into<String>,
        month: u8,
        value: impl Into<RawValue>,
    ) -> Self {
        self.values.push(SeedValue {
            indicator: indicator.into(),
            month,
            value: value.into(),
        });
        self
    }

    /// Set the same value for all twelve months.
    pub fn with_every_month(mut self, indicator: &str, value: impl Into<RawValue>) -> Self {
        let value = value.into();
        for month in 1..=12 {
            self = self.with_value(indicator, month, value.clone());
        }
        self
    }

    /// A seed needs a non-blank id.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Entities of one category keyed by id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityArena {
    entities: Arc<Vec<Arc<Entity>>>,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Entity>> {
        self.entities.iter().find(|e| e.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Arena with `entity` appended, or `None` if its id is already taken.
    pub fn insert(&self, entity: Entity) -> Option<Self> {
        if self.contains(entity.id.as_str()) {
            return None;
        }
        let mut entities = (*self.entities).clone();
        entities.push(Arc::new(entity));
        Some(Self {
            entities: Arc::new(entities),
        })
    }

    /// Arena without `id`, or `None` if there is no such entity.
    pub fn remove(&self, id: &str) -> Option<Self> {
        let position = self.entities.iter().position(|e| e.id.as_str() == id)?;
        let mut entities = (*self.entities).clone();
        entities.remove(position);
        Some(Self {
            entities: Arc::new(entities),
        })
    }

    /// Arena with `id` replaced by whatever `f` returns.
    ///
    /// Returns `None` when the id is unknown or `f` reports that nothing changed.
    pub fn update_entity<F>(&self, id: &str, f: F) -> Option<Self>
    where
        F: FnOnce(&Entity) -> Option<Entity>,
    {
        let position = self.entities.iter().position(|e| e.id.as_str() == id)?;
        let updated = f(&self.entities[position])?;
        let mut entities = (*self.entities).clone();
        entities[position] = Arc::new(updated);
        Some(Self {
            entities: Arc::new(entities),
        })
    }
}
