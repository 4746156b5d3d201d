//! Declarative ledger configuration.
//!
//! A ledger is described by industries, their categories and the formulas of each
//! category. Formulas are serialised by type name, so a whole ledger can be written in
//! TOML:
//!
//! ```toml
//! reporting_year = 2022
//! default_region = "华北"
//!
//! [[industries]]
//! key = "steel"
//! name = "Iron and steel"
//!
//! [[industries.categories]]
//! key = "electricity"
//! name = "Purchased electricity"
//! role = "ElectricityHeat"
//!
//! [[industries.categories.formulas]]
//! type = "NetPurchase"
//! carrier = "Electricity"
//! ```

use crate::aggregate::{AggregateRole, DeductionPolicy};
use crate::entity::EntitySeed;
use crate::errors::{GhgError, GhgResult};
use crate::factors::{CustomFactor, FactorRegistry};
use crate::formula::{Formula, FormulaChain, F};
use crate::industry::Industry;
use crate::ledger::Ledger;
use crate::module::CategoryModule;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Attribute every module falls back to for grid-region keyed factors.
pub const REGION_ATTRIBUTE: &str = "region";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: AggregateRole,
    #[serde(default)]
    pub formulas: Vec<F>,
    /// Attribute defaults for entities of this category
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub seeds: Vec<EntitySeed>,
}

impl CategoryConfig {
    pub fn new(key: impl Into<String>, name: impl Into<String>, role: AggregateRole) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            role,
            formulas: Vec::new(),
            attributes: BTreeMap::new(),
            seeds: Vec::new(),
        }
    }

    pub fn with_formula(mut self, formula: impl Formula + 'static) -> Self {
        self.formulas.push(Arc::new(formula));
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_seed(mut self, seed: EntitySeed) -> Self {
        self.seeds.push(seed);
        self
    }

    fn build(
        &self,
        registry: &FactorRegistry,
        year: u16,
        default_region: Option<&str>,
    ) -> GhgResult<CategoryModule> {
        let chain = FormulaChain::build(&self.key, self.formulas.clone())?;

        let mut defaults = BTreeMap::new();
        if let Some(region) = default_region {
            defaults.insert(REGION_ATTRIBUTE.to_string(), region.to_string());
        }
        defaults.extend(self.attributes.clone());

        Ok(CategoryModule::new(&self.key, &self.name, self.role, chain)
            .with_defaults(defaults)
            .with_year(Some(year))
            .with_seeds(&self.seeds, registry))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryConfig {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

impl IndustryConfig {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            categories: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: CategoryConfig) -> Self {
        self.categories.push(category);
        self
    }

    pub fn category(&self, key: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.key == key)
    }
}

/// A custom factor registered when the ledger is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFactorConfig {
    pub category: String,
    #[serde(flatten)]
    pub factor: CustomFactor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub reporting_year: u16,
    /// Grid region used by entities that do not name their own
    pub default_region: Option<String>,
    pub display_decimals: usize,
    pub deduction_policy: DeductionPolicy,
    pub industries: Vec<IndustryConfig>,
    pub factors: Vec<CustomFactorConfig>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            reporting_year: 2022,
            default_region: None,
            display_decimals: 4,
            deduction_policy: DeductionPolicy::AllowNegative,
            industries: Vec::new(),
            factors: Vec::new(),
        }
    }
}

impl LedgerConfig {
    pub fn from_toml_str(source: &str) -> GhgResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_toml_string(&self) -> GhgResult<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn with_industry(mut self, industry: IndustryConfig) -> Self {
        self.industries.push(industry);
        self
    }

    /// Build a ledger with the built-in factor tables plus the configured custom factors.
    pub fn build(&self) -> GhgResult<Ledger> {
        let mut keys = HashSet::new();
        for industry in &self.industries {
            if !keys.insert(industry.key.as_str()) {
                return Err(GhgError::DuplicateIndustry(industry.key.clone()));
            }
        }

        let mut seen = HashSet::new();
        for seed in self
            .industries
            .iter()
            .flat_map(|i| &i.categories)
            .flat_map(|c| &c.seeds)
        {
            if !seen.insert(seed.id.as_str()) {
                return Err(GhgError::DuplicateEntity(seed.id.clone()));
            }
        }

        let mut registry = FactorRegistry::new();
        for custom in &self.factors {
            registry.register(&custom.category, custom.factor.clone());
        }

        let mut industries = Vec::with_capacity(self.industries.len());
        for industry in &self.industries {
            let modules = industry
                .categories
                .iter()
                .map(|c| c.build(&registry, self.reporting_year, self.default_region.as_deref()))
                .collect::<GhgResult<Vec<_>>>()?;
            industries.push(Industry::new(
                &industry.key,
                &industry.name,
                modules,
                self.deduction_policy,
            )?);
        }

        Ledger::new(registry, industries, self.display_decimals)
    }
}
