//! Behaviour every ledger must show regardless of the industry or the data entered.

use approx::assert_relative_eq;
use ghg::industries::IndustryKind;
use ghg::{Ledger, LedgerConfig};
use ghg_core::aggregate::{AggregateRole, DeductionPolicy};
use ghg_core::entity::EntitySeed;
use ghg_core::factors::CustomFactor;
use ghg_core::propagation::{EdgeState, Notification};
use ghg_core::standard_factors::categories::ELECTRICITY;
use ghg_core::timeseries::{Month, MonthMetadata, RawValue, SupportingMaterial};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn ledger(kinds: &[IndustryKind]) -> Ledger {
    kinds
        .iter()
        .fold(
            LedgerConfig {
                default_region: Some("华北".to_string()),
                ..Default::default()
            },
            |config, kind| config.with_industry(kind.preset()),
        )
        .build()
        .unwrap()
}

fn recording(ledger: &mut Ledger) -> Rc<RefCell<Vec<Notification>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    ledger.subscribe(move |n: &Notification| sink.borrow_mut().push(n.clone()));
    seen
}

fn emission(ledger: &Ledger, entity: &str, month: usize) -> f64 {
    ledger.entity(entity).unwrap().series.values("emission")[month]
}

fn assert_all_idle(ledger: &Ledger) {
    assert_eq!(ledger.guard().state(), EdgeState::Idle);
    for industry in ledger.industries() {
        assert_eq!(industry.guard().state(), EdgeState::Idle, "{}", industry.key());
        for module in industry.modules() {
            assert_eq!(module.guard().state(), EdgeState::Idle, "{}", module.key());
        }
    }
}

mod idempotence {
    use super::*;

    #[test]
    fn test_same_value_is_silent() {
        let mut ledger = ledger(&[IndustryKind::Steel]);
        let first = ledger.set_value("steel.electricity", "purchased", 1, 1000.0);
        let seen = recording(&mut ledger);

        let again = ledger.set_value("steel.electricity", "purchased", 1, 1000.0);
        let as_text = ledger.set_value("steel.electricity", "purchased", 1, " 1000 ");

        assert!(Arc::ptr_eq(&first, &again));
        assert!(Arc::ptr_eq(&first, &as_text));
        assert!(seen.borrow().is_empty());
        assert_all_idle(&ledger);
    }

    /// One real change produces exactly one notification per level.
    #[test]
    fn test_single_notification_per_level() {
        let mut ledger = ledger(&[IndustryKind::Steel, IndustryKind::Aluminium]);
        let seen = recording(&mut ledger);

        ledger.set_value("aluminium.heat", "purchased", 2, 10.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(matches!(
            &seen[0],
            Notification::CategoryTotal { industry, total }
                if industry == "aluminium" && total.category_key == "heat"
        ));
        assert!(matches!(&seen[1], Notification::Aggregate(s) if s.industry == "aluminium"));
        assert!(matches!(&seen[2], Notification::Enterprise(_)));
        assert_all_idle(&ledger);
    }

    /// An edit that leaves the emission unchanged stops at the category.
    #[test]
    fn test_unchanged_total_stops_propagation() {
        let mut ledger = ledger(&[IndustryKind::Steel]);
        ledger.set_value("steel.electricity", "purchased", 1, 100.0);
        ledger.set_value("steel.electricity", "external_supply", 1, 150.0);
        let seen = recording(&mut ledger);

        // still fully supplied to others
        ledger.set_value("steel.electricity", "external_supply", 1, 300.0);

        assert!(seen.borrow().is_empty());
        assert_all_idle(&ledger);
    }
}

mod zero_floor {
    use super::*;

    #[test]
    fn test_net_purchase_never_negative() {
        let mut ledger = ledger(&[IndustryKind::Petrochemical]);
        let cases = [(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 10.5), (1e-9, 1e6)];
        for (month, (purchased, supplied)) in cases.into_iter().enumerate() {
            let month = month as u8 + 1;
            for entity in ["petrochemical.electricity", "petrochemical.heat"] {
                ledger.set_value(entity, "purchased", month, purchased);
                ledger.set_value(entity, "external_supply", month, supplied);
                assert_eq!(emission(&ledger, entity, month as usize - 1), 0.0);
            }
        }
        assert_eq!(ledger.snapshot().grand_total, 0.0);
    }

    #[test]
    fn test_non_numeric_entry_counts_as_zero() {
        let mut ledger = ledger(&[IndustryKind::Steel]);
        ledger.set_value("steel.electricity", "purchased", 1, 1000.0);
        let snapshot = ledger.set_value("steel.electricity", "purchased", 1, "n/a");

        assert_eq!(snapshot.grand_total, 0.0);
        let entity = ledger.entity("steel.electricity").unwrap();
        let series = entity.series.get_series("purchased").unwrap();
        let january = Month::new(1).unwrap();
        assert_eq!(series.raw(january), &RawValue::Text("n/a".to_string()));
    }
}

mod fallback_order {
    use super::*;

    #[test]
    fn test_default_then_registry_then_override() {
        let mut ledger = ledger(&[IndustryKind::Steel]);
        ledger.add_entity(
            "steel",
            "electricity",
            EntitySeed::new("offshore", "Offshore").with_attribute("region", "海外"),
        );
        ledger.set_value("offshore", "purchased", 1, 1000.0);
        ledger.set_value("steel.electricity", "purchased", 1, 1000.0);

        // no registry entry for the region: hard-coded default
        assert_relative_eq!(emission(&ledger, "offshore", 0), 0.5703, epsilon = 1e-12);
        // registry entry for 华北 2022
        assert_relative_eq!(emission(&ledger, "steel.electricity", 0), 0.6776, epsilon = 1e-12);

        ledger.set_value("offshore", "emission_factor", 1, 0.001);
        ledger.set_value("steel.electricity", "emission_factor", 1, 0.001);
        assert_relative_eq!(emission(&ledger, "offshore", 0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(emission(&ledger, "steel.electricity", 0), 1.0, epsilon = 1e-12);

        // an entered zero is still an override
        ledger.set_value("steel.electricity", "emission_factor", 1, 0.0);
        assert_eq!(emission(&ledger, "steel.electricity", 0), 0.0);

        // clearing the slot falls back to the registry
        ledger.set_value("steel.electricity", "emission_factor", 1, "");
        assert_relative_eq!(emission(&ledger, "steel.electricity", 0), 0.6776, epsilon = 1e-12);
    }

    #[test]
    fn test_custom_factor_shadows_and_restores() {
        let mut ledger = ledger(&[IndustryKind::Steel]);
        ledger.set_value("steel.electricity", "purchased", 1, 1000.0);
        let seen = recording(&mut ledger);

        let (id, snapshot) = ledger.register_custom_factor(
            ELECTRICITY,
            CustomFactor::new("华北", 0.0005, "tCO2/kWh").for_year(2022),
        );
        assert_relative_eq!(snapshot.grand_total, 0.5, epsilon = 1e-12);
        assert_eq!(seen.borrow().len(), 3);

        let snapshot = ledger.remove_custom_factor(id);
        assert_relative_eq!(snapshot.grand_total, 0.6776, epsilon = 1e-12);
        assert_eq!(ledger.registry().lookup(ELECTRICITY, "华北", Some(2022)).unwrap().value, 0.0006776);
        assert_all_idle(&ledger);
    }

    #[test]
    fn test_custom_factor_without_users_is_silent() {
        let mut ledger = ledger(&[IndustryKind::Steel]);
        let seen = recording(&mut ledger);

        let (_, snapshot) = ledger.register_custom_factor("carbonate", CustomFactor::new("BaCO3", 0.3, "tCO2/t"));

        assert_eq!(snapshot.grand_total, 0.0);
        assert!(seen.borrow().is_empty());
    }
}

mod aggregation {
    use super::*;

    #[test]
    fn test_grand_total_identity() {
        let mut ledger = ledger(&[IndustryKind::OilGas, IndustryKind::Steel]);
        ledger.add_entity("oil_gas", "fuel_combustion", EntitySeed::new("boiler", "Boiler"));
        ledger.add_entity("oil_gas", "flaring", EntitySeed::new("flare", "Flare"));
        ledger.add_entity("oil_gas", "co2_recovery", EntitySeed::new("ccus", "CCUS"));
        ledger.add_entity(
            "oil_gas",
            "fugitive",
            EntitySeed::new("compressors", "Compressors").with_attribute("device_type", "compressor"),
        );
        ledger.add_entity("steel", "electrode", EntitySeed::new("eaf", "EAF"));

        for month in 1..=12u8 {
            let m = month as f64;
            ledger.set_value("boiler", "consumption", month, 10.0 * m);
            ledger.set_value("flare", "activity", month, 0.5 * m);
            ledger.set_value("ccus", "recovered_volume", month, 0.2 * m);
            ledger.set_value("ccus", "purity", month, 95.0);
            ledger.set_value("compressors", "device_count", month, 2.0);
            ledger.set_value("eaf", "activity", month, m);
            ledger.set_value("oil_gas.electricity", "purchased", month, 100.0 * m);
            ledger.set_value("steel.heat", "purchased", month, 20.0);
        }

        let snapshot = ledger.snapshot();
        let mut enterprise_total = 0.0;
        for industry in ledger.industries() {
            let aggregate = snapshot.industry(industry.key()).unwrap();
            let mut additive = 0.0;
            let mut deduction = 0.0;
            let mut electricity_heat = 0.0;
            for module in industry.modules() {
                let total = module.total();
                let monthly: f64 = total.monthly_totals.iter().sum();
                assert_relative_eq!(total.yearly_total, monthly, epsilon = 1e-9);
                match module.role() {
                    AggregateRole::Additive => additive += total.yearly_total,
                    AggregateRole::Deduction => deduction += total.yearly_total,
                    AggregateRole::ElectricityHeat => electricity_heat += total.yearly_total,
                }
            }
            assert_relative_eq!(aggregate.additive_total, additive, epsilon = 1e-9);
            assert_relative_eq!(aggregate.deduction_total, deduction, epsilon = 1e-9);
            assert_relative_eq!(
                aggregate.grand_total,
                additive - deduction + electricity_heat,
                epsilon = 1e-9
            );
            enterprise_total += aggregate.grand_total;
        }
        assert!(snapshot.industry("oil_gas").unwrap().deduction_total > 0.0);
        assert_relative_eq!(snapshot.grand_total, enterprise_total, epsilon = 1e-9);
        assert_all_idle(&ledger);
    }

    #[test]
    fn test_clamp_policy_only_touches_negative_totals() {
        let build = |policy| {
            let mut ledger = LedgerConfig {
                deduction_policy: policy,
                ..Default::default()
            }
            .with_industry(IndustryKind::Steel.preset())
            .build()
            .unwrap();
            ledger.add_entity("steel", "electrode", EntitySeed::new("eaf", "EAF"));
            ledger.set_value("eaf", "activity", 1, 10.0);
            ledger.snapshot()
        };

        assert_eq!(
            build(DeductionPolicy::AllowNegative),
            build(DeductionPolicy::ClampAtZero)
        );
    }
}

mod entity_lifecycle {
    use super::*;

    fn seed() -> EntitySeed {
        EntitySeed::new("kiln", "Lime kiln")
            .with_attribute("material", "MgCO3")
            .with_every_month("consumption", 12.5)
            .with_value("purity", 1, 98.0)
            .with_value("purity", 7, "97.5")
    }

    #[test]
    fn test_remove_then_re_add_restores_total() {
        let mut ledger = ledger(&[IndustryKind::Aluminium]);
        let empty = ledger.category_total("aluminium", "carbonate").unwrap().clone();

        ledger.add_entity("aluminium", "carbonate", seed());
        let with_kiln = ledger.category_total("aluminium", "carbonate").unwrap().clone();
        assert!(with_kiln.yearly_total > 0.0);

        ledger.remove_entity("kiln");
        assert_eq!(ledger.category_total("aluminium", "carbonate").unwrap(), &empty);
        assert!(ledger.entity("kiln").is_none());

        ledger.add_entity("aluminium", "carbonate", seed());
        assert_eq!(ledger.category_total("aluminium", "carbonate").unwrap(), &with_kiln);
        assert_all_idle(&ledger);
    }

    #[test]
    fn test_duplicate_and_invalid_seeds_are_rejected() {
        let mut ledger = ledger(&[IndustryKind::Aluminium, IndustryKind::Steel]);
        ledger.add_entity("aluminium", "carbonate", seed());
        let seen = recording(&mut ledger);

        // ids are unique across industries
        ledger.add_entity("steel", "carbonate", seed());
        ledger.add_entity("steel", "carbonate", EntitySeed::new("  ", "Blank"));
        ledger.add_entity("steel", "no_such_category", EntitySeed::new("x", "X"));
        ledger.add_entity("cement", "carbonate", EntitySeed::new("y", "Y"));

        assert!(seen.borrow().is_empty());
        assert!(ledger.industry("steel").unwrap().module("carbonate").unwrap().entities().is_empty());
        assert!(ledger.entity("x").is_none());
    }

    #[test]
    fn test_pinned_and_unknown_entities() {
        let mut ledger = ledger(&[IndustryKind::Steel]);
        ledger.set_value("steel.electricity", "purchased", 1, 10.0);
        let before = ledger.snapshot();
        let seen = recording(&mut ledger);

        ledger.remove_entity("steel.electricity");
        ledger.remove_entity("ghost");
        ledger.set_value("ghost", "purchased", 1, 10.0);
        ledger.set_value("steel.electricity", "purchased", 13, 10.0);
        ledger.set_value("steel.electricity", "emission", 1, 10.0);

        assert!(ledger.entity("steel.electricity").is_some());
        assert!(Arc::ptr_eq(&before, &ledger.snapshot()));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_metadata_never_recomputes() {
        let mut ledger = ledger(&[IndustryKind::Steel]);
        ledger.set_value("steel.electricity", "purchased", 4, 10.0);
        let before = ledger.snapshot();
        let seen = recording(&mut ledger);

        let material = SupportingMaterial {
            name: "invoice-april.pdf".to_string(),
            size: 52_113,
            media_type: "application/pdf".to_string(),
            path: "uploads/invoice-april.pdf".to_string(),
        };
        ledger.set_month_metadata(
            "steel.electricity",
            "purchased",
            4,
            MonthMetadata {
                data_source: Some("Utility invoice".to_string()),
                material: Some(material.clone()),
                ..Default::default()
            },
        );

        let april = Month::new(4).unwrap();
        let slot = ledger
            .entity("steel.electricity")
            .unwrap()
            .series
            .get_series("purchased")
            .unwrap()
            .slot(april)
            .clone();
        assert_eq!(slot.material, Some(material));
        assert_eq!(slot.data_source.as_deref(), Some("Utility invoice"));

        ledger.clear_material("steel.electricity", "purchased", 4);
        let slot = ledger
            .entity("steel.electricity")
            .unwrap()
            .series
            .get_series("purchased")
            .unwrap()
            .slot(april)
            .clone();
        assert!(slot.material.is_none());
        assert_eq!(slot.data_source.as_deref(), Some("Utility invoice"));

        assert!(Arc::ptr_eq(&before, &ledger.snapshot()));
        assert!(seen.borrow().is_empty());
    }
}
