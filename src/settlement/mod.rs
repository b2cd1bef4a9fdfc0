pub mod accounts;
pub mod deactivation;
pub mod engine;
pub mod ledger;
pub mod store;

pub use deactivation::{DeactivationEngine, DeactivationSummary};
pub use engine::{SettlementEngine, SettlementSummary};
pub use store::InMemoryAccounts;
