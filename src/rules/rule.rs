use crate::types::balance::Balance;
use crate::types::ids::RuleId;
use crate::types::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// One balance-tier rule: accounts whose balance falls inside
/// `[min_balance, max_balance]` (inclusive both ends) receive
/// `profit_amount` at settlement. A negative amount is a daily loss.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfitRule {
    pub rule_id: RuleId,
    pub min_balance: Balance,
    pub max_balance: Balance,
    pub profit_amount: Balance,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProfitRule {
    pub fn new(min_balance: Balance, max_balance: Balance, profit_amount: Balance) -> Self {
        let now = Timestamp::now();
        ProfitRule {
            rule_id: RuleId::new(),
            min_balance,
            max_balance,
            profit_amount,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contains(&self, balance: Balance) -> bool {
        self.min_balance <= balance && balance <= self.max_balance
    }

    pub fn overlaps(&self, min: Balance, max: Balance) -> bool {
        self.min_balance <= max && min <= self.max_balance
    }
}
