use crate::error::{Error, Result};
use crate::rules::rule::ProfitRule;
use crate::types::balance::Balance;
use crate::types::ids::RuleId;
use crate::types::timestamp::Timestamp;

/// Outcome of resolving a balance against the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule_id: RuleId,
    pub profit: Balance,
}

/// Ordered balance-range -> profit-amount decision table.
///
/// Active rules never overlap; the invariant is enforced on every mutation
/// that introduces or re-activates a range, never at read time.
#[derive(Clone, Debug, Default)]
pub struct RuleTable {
    rules: Vec<ProfitRule>,
}

impl RuleTable {
    pub fn new() -> Self {
        RuleTable { rules: Vec::new() }
    }

    pub fn list(&self) -> &[ProfitRule] {
        &self.rules
    }

    pub fn get(&self, rule_id: RuleId) -> Result<&ProfitRule> {
        self.rules
            .iter()
            .find(|r| r.rule_id == rule_id)
            .ok_or(Error::RuleNotFound(rule_id))
    }

    pub fn create(
        &mut self,
        min_balance: Balance,
        max_balance: Balance,
        profit_amount: Balance,
    ) -> Result<ProfitRule> {
        self.validate_range(min_balance, max_balance, None)?;

        let rule = ProfitRule::new(min_balance, max_balance, profit_amount);
        self.rules.push(rule.clone());
        self.rules.sort_by_key(|r| r.min_balance);

        Ok(rule)
    }

    pub fn update(
        &mut self,
        rule_id: RuleId,
        min_balance: Balance,
        max_balance: Balance,
        profit_amount: Balance,
    ) -> Result<ProfitRule> {
        // Validate before mutating so a rejection leaves the table unchanged.
        if min_balance > max_balance {
            return Err(Error::InvalidRuleRange {
                min: min_balance,
                max: max_balance,
            });
        }
        if self.get(rule_id)?.active {
            self.validate_range(min_balance, max_balance, Some(rule_id))?;
        }

        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.rule_id == rule_id)
            .ok_or(Error::RuleNotFound(rule_id))?;

        rule.min_balance = min_balance;
        rule.max_balance = max_balance;
        rule.profit_amount = profit_amount;
        rule.updated_at = Timestamp::now();
        let updated = rule.clone();

        self.rules.sort_by_key(|r| r.min_balance);
        Ok(updated)
    }

    pub fn delete(&mut self, rule_id: RuleId) -> Result<()> {
        let before = self.rules.len();
        self.rules.retain(|r| r.rule_id != rule_id);

        if self.rules.len() == before {
            return Err(Error::RuleNotFound(rule_id));
        }
        Ok(())
    }

    /// Flip a rule's active flag. Re-activating a rule re-checks the overlap
    /// invariant the same way `create` does.
    pub fn toggle(&mut self, rule_id: RuleId) -> Result<ProfitRule> {
        let (min, max, was_active) = {
            let rule = self.get(rule_id)?;
            (rule.min_balance, rule.max_balance, rule.active)
        };

        if !was_active {
            self.validate_range(min, max, Some(rule_id))?;
        }

        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.rule_id == rule_id)
            .ok_or(Error::RuleNotFound(rule_id))?;
        rule.active = !was_active;
        rule.updated_at = Timestamp::now();

        Ok(rule.clone())
    }

    /// Select the active rule containing `balance`. No match is a valid
    /// outcome, not an error. Should the overlap invariant ever have been
    /// bypassed, ties break deterministically by lowest `min_balance`
    /// (the table is kept sorted by it).
    pub fn resolve(&self, balance: Balance) -> Option<RuleMatch> {
        self.rules
            .iter()
            .filter(|r| r.active && r.contains(balance))
            .min_by_key(|r| r.min_balance)
            .map(|r| RuleMatch {
                rule_id: r.rule_id,
                profit: r.profit_amount,
            })
    }

    /// Cycle-start snapshot for the settlement engine: rule changes made
    /// while a cycle is running apply from the next cycle.
    pub fn snapshot(&self) -> RuleTable {
        self.clone()
    }

    fn validate_range(
        &self,
        min: Balance,
        max: Balance,
        exclude: Option<RuleId>,
    ) -> Result<()> {
        if min > max {
            return Err(Error::InvalidRuleRange { min, max });
        }

        if let Some(existing) = self
            .rules
            .iter()
            .filter(|r| r.active && Some(r.rule_id) != exclude)
            .find(|r| r.overlaps(min, max))
        {
            return Err(Error::RuleRangeOverlap {
                min,
                max,
                existing: existing.rule_id,
            });
        }
        Ok(())
    }
}
