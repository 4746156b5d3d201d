//! Core of the emission accounting engine.
//!
//! Data flows strictly from leaf to root: an edit to an entity's indicator re-evaluates
//! that entity's formulas, recomputes its category total, and only a value-level change
//! travels further up to the industry and the enterprise.

pub mod aggregate;
pub mod collection;
pub mod config;
pub mod entity;
pub mod errors;
#[cfg(test)]
mod example_components;
pub mod factors;
pub mod formula;
pub mod indicator;
pub mod industry;
pub mod ledger;
pub mod module;
pub mod propagation;
pub mod standard_factors;
pub mod standard_indicators;
pub mod timeseries;

#[doc(hidden)]
pub use inventory;
