//! Formulas and the generic formula dispatcher.
//!
//! A [`Formula`] is a pure, single-month function from activity values and resolved
//! factors to derived indicator values. Every calculation family implements the same trait
//! and declares what it reads and writes through a [`FormulaSpec`], so a category module
//! needs no code of its own: it hands each entity to a [`FormulaChain`], which resolves
//! all inputs and factors for a month and then evaluates.
//!
//! A category may use several formulas where a later one consumes the outputs of an
//! earlier one. The chain orders them topologically when it is built and rejects cycles.

use crate::entity::Entity;
use crate::errors::{GhgError, GhgResult};
use crate::factors::{FactorContext, FactorRegistry, FactorRequirement, FactorTier, ResolvedFactor};
use crate::indicator::{IndicatorKind, INDICATOR_REGISTRY};
use crate::standard_indicators::IND_EMISSION;
use crate::timeseries::{FloatValue, Month, MONTHS};
use log::debug;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::Arc;

/// Output of a single formula evaluation, keyed by indicator.
pub type OutputState = HashMap<String, FloatValue>;

/// An indicator a formula reads or writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRequirement {
    pub key: String,
    pub unit: String,
}

impl IndicatorRequirement {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let unit = INDICATOR_REGISTRY.unit_of(&key);
        Self { key, unit }
    }
}

/// Declaration of what a formula reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormulaSpec {
    pub inputs: Vec<IndicatorRequirement>,
    pub factors: Vec<FactorRequirement>,
    pub outputs: Vec<IndicatorRequirement>,
}

impl FormulaSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, key: impl Into<String>) -> Self {
        self.inputs.push(IndicatorRequirement::new(key));
        self
    }

    pub fn factor(mut self, requirement: FactorRequirement) -> Self {
        self.factors.push(requirement);
        self
    }

    pub fn output(mut self, key: impl Into<String>) -> Self {
        self.outputs.push(IndicatorRequirement::new(key));
        self
    }
}

/// Everything a formula may read for one month.
///
/// Missing values and factors read as zero.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    month: Option<Month>,
    values: HashMap<String, FloatValue>,
    factors: HashMap<String, ResolvedFactor>,
    attributes: BTreeMap<String, String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_month(month: Month) -> Self {
        Self {
            month: Some(month),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: FloatValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn with_factor(mut self, name: impl Into<String>, value: FloatValue) -> Self {
        self.factors.insert(
            name.into(),
            ResolvedFactor {
                value,
                tier: FactorTier::Override,
            },
        );
        self
    }

    pub fn with_resolved_factor(mut self, name: impl Into<String>, factor: ResolvedFactor) -> Self {
        self.factors.insert(name.into(), factor);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn month(&self) -> Option<Month> {
        self.month
    }

    pub fn get(&self, key: &str) -> FloatValue {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    pub fn factor(&self, name: &str) -> FloatValue {
        match self.factors.get(name) {
            Some(factor) => factor.value,
            None => {
                debug!("Factor '{}' was not resolved; reading 0", name);
                0.0
            }
        }
    }

    pub fn factor_tier(&self, name: &str) -> Option<FactorTier> {
        self.factors.get(name).map(|f| f.tier)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// A calculation family.
///
/// Implementations must be deterministic and must not round: rounding happens only when
/// values are formatted for display.
#[typetag::serde(tag = "type")]
pub trait Formula: Debug + Send + Sync {
    /// Inputs, factors and outputs of the formula.
    fn spec(&self) -> FormulaSpec;

    /// Evaluate a single month.
    fn evaluate(&self, inputs: &InputState) -> OutputState;
}

/// Shared handle to a formula.
pub type F = Arc<dyn Formula>;

/// Formulas of one category in dependency order.
#[derive(Debug, Clone)]
pub struct FormulaChain {
    formulas: Vec<F>,
    specs: Vec<FormulaSpec>,
}

impl FormulaChain {
    /// Order `formulas` so that every formula runs after the producers of its inputs.
    ///
    /// Fails if an output is produced twice, the outputs form a cycle, or no formula
    /// produces the `emission` indicator that category totals are summed from.
    pub fn build(category: &str, formulas: Vec<F>) -> GhgResult<Self> {
        let specs: Vec<FormulaSpec> = formulas.iter().map(|f| f.spec()).collect();

        let mut producers: HashMap<&str, usize> = HashMap::new();
        for (index, spec) in specs.iter().enumerate() {
            for output in &spec.outputs {
                if producers.insert(output.key.as_str(), index).is_some() {
                    return Err(GhgError::DuplicateOutput {
                        category: category.to_string(),
                        output: output.key.clone(),
                    });
                }
            }
        }
        if !producers.contains_key(IND_EMISSION.key) {
            return Err(GhgError::MissingEmissionOutput(category.to_string()));
        }

        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..specs.len()).map(|i| graph.add_node(i)).collect();
        for (consumer, spec) in specs.iter().enumerate() {
            for input in &spec.inputs {
                if let Some(&producer) = producers.get(input.key.as_str()) {
                    graph.update_edge(nodes[producer], nodes[consumer], ());
                }
            }
        }

        let order = toposort(&graph, None)
            .map_err(|_| GhgError::CyclicFormulaChain(category.to_string()))?;

        let mut formulas: Vec<Option<F>> = formulas.into_iter().map(Some).collect();
        let mut specs: Vec<Option<FormulaSpec>> = specs.into_iter().map(Some).collect();
        let mut ordered_formulas = Vec::with_capacity(order.len());
        let mut ordered_specs = Vec::with_capacity(order.len());
        for node in order {
            let index = graph[node];
            if let (Some(formula), Some(spec)) = (formulas[index].take(), specs[index].take()) {
                ordered_formulas.push(formula);
                ordered_specs.push(spec);
            }
        }

        Ok(Self {
            formulas: ordered_formulas,
            specs: ordered_specs,
        })
    }

    pub fn specs(&self) -> &[FormulaSpec] {
        &self.specs
    }

    pub fn formulas(&self) -> &[F] {
        &self.formulas
    }

    fn is_derived(&self, key: &str) -> bool {
        self.specs
            .iter()
            .any(|spec| spec.outputs.iter().any(|o| o.key == key))
    }

    /// Every indicator an entity of this chain carries, with its kind.
    ///
    /// Activity inputs come first, then factor overrides, then derived outputs, each in
    /// declaration order.
    pub fn indicator_layout(&self) -> Vec<(String, IndicatorKind)> {
        let mut layout: Vec<(String, IndicatorKind)> = Vec::new();
        let mut push = |key: &str, kind: IndicatorKind| {
            if !layout.iter().any(|(k, _)| k == key) {
                layout.push((key.to_string(), kind));
            }
        };

        for spec in &self.specs {
            for input in spec.inputs.iter().filter(|i| !self.is_derived(&i.key)) {
                push(&input.key, IndicatorKind::Activity);
            }
        }
        for spec in &self.specs {
            for factor in &spec.factors {
                if let Some(key) = &factor.override_indicator {
                    push(key, IndicatorKind::Override);
                }
            }
        }
        for spec in &self.specs {
            for output in &spec.outputs {
                push(&output.key, IndicatorKind::Derived);
            }
        }
        layout
    }

    /// Evaluate every derived indicator of `entity` for all twelve months.
    pub fn evaluate(
        &self,
        entity: &Entity,
        registry: &FactorRegistry,
        year: Option<u16>,
        defaults: &BTreeMap<String, String>,
    ) -> BTreeMap<String, [FloatValue; MONTHS]> {
        let context = FactorContext {
            year,
            attributes: &entity.attributes,
            defaults,
        };
        let mut attributes = defaults.clone();
        attributes.extend(entity.attributes.clone());

        let mut derived: BTreeMap<String, [FloatValue; MONTHS]> = BTreeMap::new();
        for month in Month::all() {
            let mut produced: HashMap<&str, FloatValue> = HashMap::new();

            for (formula, spec) in self.formulas.iter().zip(&self.specs) {
                let mut state = InputState {
                    month: Some(month),
                    attributes: attributes.clone(),
                    ..Default::default()
                };
                for input in &spec.inputs {
                    let value = match produced.get(input.key.as_str()) {
                        Some(value) => *value,
                        None => entity.series.value(&input.key, month),
                    };
                    state.values.insert(input.key.clone(), value);
                }
                for factor in &spec.factors {
                    let override_value = factor
                        .override_indicator
                        .as_deref()
                        .and_then(|key| entity.series.entered(key, month));
                    state
                        .factors
                        .insert(factor.name.clone(), factor.resolve(registry, &context, override_value));
                }

                let outputs = formula.evaluate(&state);
                for output in &spec.outputs {
                    let value = outputs
                        .get(&output.key)
                        .copied()
                        .filter(|v| v.is_finite())
                        .unwrap_or(0.0);
                    produced.insert(output.key.as_str(), value);
                    derived.entry(output.key.clone()).or_insert([0.0; MONTHS])[month.index()] =
                        value;
                }
            }
        }
        derived
    }
}
