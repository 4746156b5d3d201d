//! Building ledgers from configuration files
//!
//! Industries whose key names a preset may leave out anything the preset provides:
//!
//! ```toml
//! reporting_year = 2022
//! default_region = "华北"
//!
//! [[industries]]
//! key = "steel"
//!
//! [[industries.categories]]
//! key = "electrode"
//! seeds = [{ id = "eaf-1", name = "EAF 1" }]
//! ```
//!
//! Every category of the preset is kept. A configured category with the same key and no
//! formulas inherits the preset's name, role and formulas while keeping its own seeds and
//! attributes; one with formulas replaces the preset category. Categories the preset does not
//! know are appended.

use crate::industries::IndustryKind;
use ghg_core::config::{CategoryConfig, IndustryConfig, LedgerConfig};
use ghg_core::errors::{GhgError, GhgResult};
use ghg_core::ledger::Ledger;
use log::{debug, info};
use std::path::Path;

/// Merge a configured industry into the preset of the same key.
pub fn merge_with_preset(industry: IndustryConfig) -> GhgResult<IndustryConfig> {
    let kind: IndustryKind = industry.key.parse()?;
    let mut merged = kind.preset();
    if !industry.name.is_empty() {
        merged.name = industry.name;
    }

    for category in industry.categories {
        match merged.categories.iter_mut().find(|c| c.key == category.key) {
            Some(preset) if category.formulas.is_empty() => inherit(preset, category),
            Some(preset) => {
                debug!("Category '{}' of {} replaces the preset", category.key, kind);
                *preset = category;
            }
            None => merged.categories.push(category),
        }
    }
    Ok(merged)
}

fn inherit(preset: &mut CategoryConfig, configured: CategoryConfig) {
    if !configured.name.is_empty() {
        preset.name = configured.name;
    }
    preset.attributes.extend(configured.attributes);
    preset.seeds.extend(configured.seeds);
}

/// Expand every industry that relies on a preset.
///
/// An industry is completed from its preset when its key names one. Other industries must
/// be fully specified and pass through unchanged.
pub fn expand_presets(mut config: LedgerConfig) -> GhgResult<LedgerConfig> {
    let industries = std::mem::take(&mut config.industries);
    for industry in industries {
        let is_preset = industry.key.parse::<IndustryKind>().is_ok();
        let industry = if is_preset {
            merge_with_preset(industry)?
        } else if industry.categories.is_empty() {
            return Err(GhgError::UnknownIndustry(industry.key));
        } else {
            industry
        };
        config.industries.push(industry);
    }
    Ok(config)
}

pub fn ledger_from_toml(source: &str) -> GhgResult<Ledger> {
    let config = expand_presets(LedgerConfig::from_toml_str(source)?)?;
    info!(
        "Building ledger for {} with {} industries",
        config.reporting_year,
        config.industries.len()
    );
    config.build()
}

pub fn ledger_from_file(path: impl AsRef<Path>) -> GhgResult<Ledger> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| GhgError::Error(format!("Could not read {}: {}", path.display(), e)))?;
    ledger_from_toml(&source)
}
