use crate::error::Result;
use crate::interfaces::account_store::AccountStore;
use crate::observability::metrics;
use crate::types::timestamp::Timestamp;

pub const DEACTIVATION_DESCRIPTION: &str = "AI trading auto-deactivated";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DeactivationSummary {
    pub users_deactivated: u64,
}

/// Flips participation off for every opted-in account after the daily
/// settlement, leaving a zero-amount system marker in each ledger.
///
/// One bulk store operation: a store failure fails the whole run, which is
/// acceptable because no money moves here.
pub struct DeactivationEngine;

impl DeactivationEngine {
    pub fn new() -> Self {
        DeactivationEngine
    }

    pub fn run(&self, store: &mut dyn AccountStore) -> Result<DeactivationSummary> {
        let affected = store.deactivate_participants(DEACTIVATION_DESCRIPTION, Timestamp::now())?;

        let summary = DeactivationSummary {
            users_deactivated: affected.len() as u64,
        };
        metrics::DEACTIVATED_ACCOUNTS.inc_by(summary.users_deactivated as f64);
        tracing::info!(
            users_deactivated = summary.users_deactivated,
            "deactivation run complete"
        );

        Ok(summary)
    }
}

impl Default for DeactivationEngine {
    fn default() -> Self {
        DeactivationEngine::new()
    }
}
