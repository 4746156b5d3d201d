pub mod activity_factor;
pub mod byproduct_gas;
mod carbon_balance;
pub mod carbonate;
pub mod fuel_combustion;
pub mod fugitive;
pub mod net_purchase;
mod pfc;
pub mod recovery;

pub use activity_factor::{ActivityFactor, ActivityFactorParameters};
pub use byproduct_gas::{
    ByproductDisposal, ByproductDisposalParameters, ByproductGeneration,
    ByproductGenerationParameters,
};
pub use carbon_balance::CarbonBalance;
pub use carbonate::{CarbonateDecomposition, CarbonateDecompositionParameters};
pub use fuel_combustion::{FuelCombustion, FuelCombustionParameters};
pub use fugitive::{FugitiveEmission, FugitiveEmissionParameters, MetricType};
pub use net_purchase::{EnergyCarrier, NetPurchase, NetPurchaseParameters};
pub use pfc::{AnodeEffectPfc, AnodeEffectPfcParameters};
pub use recovery::{GasRecovery, GasRecoveryParameters};
