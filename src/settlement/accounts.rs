use crate::settlement::ledger::LedgerEntry;
use crate::types::balance::Balance;
use crate::types::ids::{AccountId, UserId};
use crate::types::percent::Percent;
use crate::types::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Rolling snapshot of the most recent settlement outcome. Overwritten
/// every cycle; not a historical series.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ProfitStats {
    pub last_profit: Balance,
    pub last_percentage: Percent,
    pub last_computed_at: Timestamp,
}

impl ProfitStats {
    pub fn zeroed(now: Timestamp) -> Self {
        ProfitStats {
            last_profit: Balance::zero(),
            last_percentage: Percent::zero(),
            last_computed_at: now,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub user_id: UserId,
    pub balance: Balance,
    /// Opt-in flag for the daily settlement ("AI trading" active).
    pub participating: bool,
    pub profit_stats: ProfitStats,
    pub ledger: Vec<LedgerEntry>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    pub fn new(user_id: UserId) -> Self {
        let now = Timestamp::now();
        Account {
            account_id: AccountId::from_user(user_id),
            user_id,
            balance: Balance::zero(),
            participating: false,
            profit_stats: ProfitStats::zeroed(now),
            ledger: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
