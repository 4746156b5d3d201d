//! Emission formulas for the industries covered by the accounting guidelines
//!
//! Every formula implements [`ghg_core::formula::Formula`] and is registered with
//! `typetag` so it can be named by `type` in a ledger configuration.

pub mod components;
