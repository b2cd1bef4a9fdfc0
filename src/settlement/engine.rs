use crate::error::{Error, Result};
use crate::interfaces::account_store::{AccountStore, SettlementUpdate};
use crate::observability::{metrics, tracing as obs};
use crate::rules::table::RuleTable;
use crate::types::balance::Balance;
use crate::types::ids::UserId;
use crate::types::percent::Percent;
use crate::types::timestamp::Timestamp;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

pub const PROFIT_DESCRIPTION: &str = "Daily AI trading profit";
pub const LOSS_DESCRIPTION: &str = "Daily AI trading loss";

/// Aggregate outcome of one settlement cycle, for observability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SettlementSummary {
    pub users_processed: u64,
    pub users_updated: u64,
    pub users_failed: u64,
    pub total_delta: Balance,
}

/// The daily profit/loss applicator.
///
/// Each `run` is an independent cycle: it snapshots the rule table once,
/// then settles every participating account on its own, so one account's
/// store failure never blocks the others. Invoked by the scheduler or by
/// the manual operational trigger; both paths are identical.
pub struct SettlementEngine {
    rules: Arc<RwLock<RuleTable>>,
    halted: AtomicBool,
}

impl SettlementEngine {
    pub fn new(rules: Arc<RwLock<RuleTable>>) -> Self {
        SettlementEngine {
            rules,
            halted: AtomicBool::new(false),
        }
    }

    pub async fn run(&self, store: &mut dyn AccountStore) -> Result<SettlementSummary> {
        if self.halted.load(Ordering::SeqCst) {
            tracing::warn!("settlement engine is halted, refusing to run");
            return Err(Error::EngineHalted);
        }

        let span = obs::settlement_cycle_span();
        let _guard = span.enter();
        let started = std::time::Instant::now();

        // Rule snapshot for the whole cycle: mid-cycle rule edits apply
        // from the next cycle.
        let rules = self.rules.read().await.snapshot();

        let mut summary = SettlementSummary::default();
        for user_id in store.participants() {
            summary.users_processed += 1;

            match self.settle_account(&rules, store, user_id) {
                Ok(Some(delta)) => {
                    summary.users_updated += 1;
                    summary.total_delta = summary.total_delta.saturating_add(delta);
                }
                Ok(None) => {}
                Err(e) => {
                    // Contained: log, count, move on to the next account.
                    summary.users_failed += 1;
                    metrics::SETTLEMENT_ACCOUNTS_FAILED.inc();
                    tracing::error!(user_id = %user_id, error = %e, "account settlement failed, skipping");
                }
            }
        }

        metrics::SETTLEMENT_CYCLES.inc();
        metrics::SETTLEMENT_ACCOUNTS_PROCESSED.inc_by(summary.users_processed as f64);
        metrics::SETTLEMENT_ACCOUNTS_UPDATED.inc_by(summary.users_updated as f64);
        metrics::SETTLEMENT_LAST_DELTA.set(summary.total_delta.to_i64());
        metrics::SETTLEMENT_CYCLE_DURATION.observe(started.elapsed().as_secs_f64());

        tracing::info!(
            users_processed = summary.users_processed,
            users_updated = summary.users_updated,
            users_failed = summary.users_failed,
            total_delta = %summary.total_delta,
            "settlement cycle complete"
        );

        Ok(summary)
    }

    fn settle_account(
        &self,
        rules: &RuleTable,
        store: &mut dyn AccountStore,
        user_id: UserId,
    ) -> Result<Option<Balance>> {
        let span = obs::account_settlement_span(&user_id);
        let _guard = span.enter();

        let previous_balance = store.get_account(user_id)?.balance;
        let now = Timestamp::now();

        let Some(matched) = rules.resolve(previous_balance) else {
            // No applicable tier: zero the snapshot, write no ledger entry.
            store.reset_profit_stats(user_id, now)?;
            return Ok(None);
        };
        if matched.profit.is_zero() {
            store.reset_profit_stats(user_id, now)?;
            return Ok(None);
        }

        let description = if matched.profit.is_positive() {
            PROFIT_DESCRIPTION
        } else {
            LOSS_DESCRIPTION
        };
        let update = SettlementUpdate {
            profit: matched.profit,
            percentage: Percent::of(matched.profit, previous_balance),
            rule_id: matched.rule_id,
            description: description.to_string(),
            applied_at: now,
        };
        store.apply_settlement(user_id, &update)?;

        tracing::debug!(
            user_id = %user_id,
            previous_balance = %previous_balance,
            profit = %matched.profit,
            "account settled"
        );
        Ok(Some(matched.profit))
    }

    pub fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
        tracing::warn!("settlement engine HALTED");
    }

    pub fn resume(&self) {
        self.halted.store(false, Ordering::SeqCst);
        tracing::info!("settlement engine RESUMED");
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }
}
