//! Greenhouse-gas emission accounting for industrial enterprises
//!
//! A [`Ledger`] holds the monthly activity data of every emission source of an enterprise,
//! grouped by industry and emission category. Every edit re-evaluates the formulas of the
//! touched entity and rolls the change up through the category, industry and enterprise
//! totals. Each level only reports upward when its value actually changed.
//!
//! ```
//! use ghg::industries::IndustryKind;
//! use ghg::LedgerConfig;
//!
//! let mut ledger = LedgerConfig {
//!     default_region: Some("华北".to_string()),
//!     ..Default::default()
//! }
//! .with_industry(IndustryKind::Steel.preset())
//! .build()
//! .unwrap();
//!
//! ledger.set_value("steel.electricity", "purchased", 1, 1000.0);
//! let snapshot = ledger.set_value("steel.electricity", "external_supply", 1, 200.0);
//! assert_eq!(ledger.format(snapshot.grand_total), "0.5421");
//! ```

pub use ghg_components;
pub use ghg_core;

pub use ghg_core::config::LedgerConfig;
pub use ghg_core::errors::{GhgError, GhgResult};
pub use ghg_core::ledger::{EnterpriseSnapshot, Ledger};

pub mod industries;
pub mod loader;
