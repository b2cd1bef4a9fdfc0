use crate::error::Result;
use crate::settlement::accounts::Account;
use crate::settlement::ledger::EntryKind;
use crate::types::balance::Balance;
use crate::types::ids::{RuleId, UserId};
use crate::types::percent::Percent;
use crate::types::timestamp::Timestamp;

/// One settled account mutation: balance delta, the ledger entry it must
/// produce, and the profit-stats snapshot, applied as a single unit.
#[derive(Clone, Debug)]
pub struct SettlementUpdate {
    pub profit: Balance,
    pub percentage: Percent,
    pub rule_id: RuleId,
    pub description: String,
    pub applied_at: Timestamp,
}

/// Persistence boundary for accounts. Every method is one atomic unit
/// against the store: callers never read-then-blind-write across two calls,
/// so concurrent administrative balance changes are never lost.
pub trait AccountStore: Send + Sync {
    fn create_account(&mut self, user_id: UserId) -> Result<Account>;

    fn get_account(&self, user_id: UserId) -> Result<&Account>;

    /// Credit or debit an account outside the settlement cycle (deposit
    /// approval, commission), recording the matching ledger entry.
    /// Returns the balance after the mutation.
    fn adjust_balance(
        &mut self,
        user_id: UserId,
        amount: Balance,
        kind: EntryKind,
        description: &str,
    ) -> Result<Balance>;

    fn set_participating(&mut self, user_id: UserId, participating: bool) -> Result<()>;

    /// Users currently opted in to the daily settlement.
    fn participants(&self) -> Vec<UserId>;

    /// Apply one settlement outcome: `balance += profit`, append exactly one
    /// ledger entry, overwrite the profit-stats snapshot.
    fn apply_settlement(&mut self, user_id: UserId, update: &SettlementUpdate) -> Result<()>;

    /// Zero the profit-stats snapshot for an account no rule matched.
    fn reset_profit_stats(&mut self, user_id: UserId, now: Timestamp) -> Result<()>;

    /// Bulk-clear the participation flag, appending one system ledger
    /// marker per affected account. Returns the affected users.
    fn deactivate_participants(&mut self, description: &str, now: Timestamp) -> Result<Vec<UserId>>;
}
