use crate::error::{Error, Result};
use crate::interfaces::account_store::{AccountStore, SettlementUpdate};
use crate::settlement::accounts::{Account, ProfitStats};
use crate::settlement::ledger::{self, EntryKind, LedgerEntry};
use crate::types::balance::Balance;
use crate::types::ids::{AccountId, UserId};
use crate::types::timestamp::Timestamp;
use std::collections::HashMap;

/// In-memory account store. Each trait method completes under one `&mut
/// self` borrow, which is the atomic unit the settlement engine relies on;
/// callers serialize access through the lock that owns this value.
#[derive(Default)]
pub struct InMemoryAccounts {
    accounts: HashMap<UserId, Account>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        InMemoryAccounts {
            accounts: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Audit check: the balance must equal the ledger replayed from zero.
    /// Holds as long as every balance mutation went through this store.
    pub fn verify_ledger(&self, user_id: UserId) -> Result<bool> {
        let account = self.account(user_id)?;
        Ok(ledger::replay(&account.ledger) == account.balance)
    }

    fn account(&self, user_id: UserId) -> Result<&Account> {
        self.accounts
            .get(&user_id)
            .ok_or(Error::AccountNotFound(AccountId::from_user(user_id)))
    }

    fn account_mut(&mut self, user_id: UserId) -> Result<&mut Account> {
        self.accounts
            .get_mut(&user_id)
            .ok_or(Error::AccountNotFound(AccountId::from_user(user_id)))
    }
}

impl AccountStore for InMemoryAccounts {
    fn create_account(&mut self, user_id: UserId) -> Result<Account> {
        if self.accounts.contains_key(&user_id) {
            return Err(Error::AccountAlreadyExists(AccountId::from_user(user_id)));
        }

        let account = Account::new(user_id);
        self.accounts.insert(user_id, account.clone());
        Ok(account)
    }

    fn get_account(&self, user_id: UserId) -> Result<&Account> {
        self.account(user_id)
    }

    fn adjust_balance(
        &mut self,
        user_id: UserId,
        amount: Balance,
        kind: EntryKind,
        description: &str,
    ) -> Result<Balance> {
        let now = Timestamp::now();
        let account = self.account_mut(user_id)?;

        let delta = match kind {
            EntryKind::Credit => amount,
            EntryKind::Debit => -amount,
            EntryKind::System => Balance::zero(),
        };
        let balance_after = account
            .balance
            .checked_add(delta)
            .ok_or_else(|| Error::Overflow {
                operation: "adjust_balance".to_string(),
            })?;

        account.balance = balance_after;
        account.ledger.push(LedgerEntry::new(
            kind,
            amount,
            description,
            None,
            balance_after,
            now,
        ));
        account.updated_at = now;

        Ok(balance_after)
    }

    fn set_participating(&mut self, user_id: UserId, participating: bool) -> Result<()> {
        let now = Timestamp::now();
        let account = self.account_mut(user_id)?;
        account.participating = participating;
        account.updated_at = now;
        Ok(())
    }

    fn participants(&self) -> Vec<UserId> {
        self.accounts
            .values()
            .filter(|a| a.participating)
            .map(|a| a.user_id)
            .collect()
    }

    fn apply_settlement(&mut self, user_id: UserId, update: &SettlementUpdate) -> Result<()> {
        let account = self.account_mut(user_id)?;

        let balance_after = account
            .balance
            .checked_add(update.profit)
            .ok_or_else(|| Error::Overflow {
                operation: "apply_settlement".to_string(),
            })?;

        let kind = if update.profit.is_positive() {
            EntryKind::Credit
        } else {
            EntryKind::Debit
        };

        account.balance = balance_after;
        account.ledger.push(LedgerEntry::new(
            kind,
            update.profit.abs(),
            &update.description,
            Some(update.rule_id),
            balance_after,
            update.applied_at,
        ));
        account.profit_stats = ProfitStats {
            last_profit: update.profit,
            last_percentage: update.percentage,
            last_computed_at: update.applied_at,
        };
        account.updated_at = update.applied_at;

        Ok(())
    }

    fn reset_profit_stats(&mut self, user_id: UserId, now: Timestamp) -> Result<()> {
        let account = self.account_mut(user_id)?;
        account.profit_stats = ProfitStats::zeroed(now);
        account.updated_at = now;
        Ok(())
    }

    fn deactivate_participants(&mut self, description: &str, now: Timestamp) -> Result<Vec<UserId>> {
        let mut affected = Vec::new();

        for account in self.accounts.values_mut().filter(|a| a.participating) {
            account.participating = false;
            account.ledger.push(LedgerEntry::new(
                EntryKind::System,
                Balance::zero(),
                description,
                None,
                account.balance,
                now,
            ));
            account.updated_at = now;
            affected.push(account.user_id);
        }

        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::account_store::SettlementUpdate;
    use crate::types::ids::RuleId;
    use crate::types::percent::Percent;

    fn bal(v: i64) -> Balance {
        Balance::from_i64(v)
    }

    fn store_with_user(balance: i64, participating: bool) -> (InMemoryAccounts, UserId) {
        let mut store = InMemoryAccounts::new();
        let user = UserId::new();
        store.create_account(user).unwrap();
        if balance != 0 {
            store
                .adjust_balance(user, bal(balance), EntryKind::Credit, "Deposit approved")
                .unwrap();
        }
        store.set_participating(user, participating).unwrap();
        (store, user)
    }

    #[test]
    fn new_accounts_start_flat_and_opted_out() {
        let mut store = InMemoryAccounts::new();
        let user = UserId::new();
        let account = store.create_account(user).unwrap();

        assert_eq!(account.balance, Balance::zero());
        assert!(!account.participating);
        assert!(account.ledger.is_empty());
        assert!(matches!(
            store.create_account(user).unwrap_err(),
            Error::AccountAlreadyExists(_)
        ));
    }

    #[test]
    fn adjust_balance_writes_matching_ledger_entry() {
        let (mut store, user) = store_with_user(0, false);

        store
            .adjust_balance(user, bal(250), EntryKind::Credit, "Deposit approved")
            .unwrap();
        store
            .adjust_balance(user, bal(40), EntryKind::Debit, "Withdrawal approved")
            .unwrap();

        let account = store.get_account(user).unwrap();
        assert_eq!(account.balance, bal(210));
        assert_eq!(account.ledger.len(), 2);
        assert_eq!(account.ledger[1].balance_after, bal(210));
        assert!(store.verify_ledger(user).unwrap());
    }

    #[test]
    fn apply_settlement_is_one_atomic_mutation() {
        let (mut store, user) = store_with_user(150, true);

        let update = SettlementUpdate {
            profit: bal(10),
            percentage: Percent::from_f64(6.67),
            rule_id: RuleId::new(),
            description: "Daily AI trading profit".to_string(),
            applied_at: Timestamp::now(),
        };
        store.apply_settlement(user, &update).unwrap();

        let account = store.get_account(user).unwrap();
        assert_eq!(account.balance, bal(160));
        assert_eq!(account.profit_stats.last_profit, bal(10));
        assert_eq!(account.profit_stats.last_percentage, Percent::from_f64(6.67));

        let entry = account.ledger.last().unwrap();
        assert_eq!(entry.kind, EntryKind::Credit);
        assert_eq!(entry.amount, bal(10));
        assert_eq!(entry.rule_reference, Some(update.rule_id));
        assert!(store.verify_ledger(user).unwrap());
    }

    #[test]
    fn losses_are_recorded_as_debits() {
        let (mut store, user) = store_with_user(150, true);

        let update = SettlementUpdate {
            profit: bal(-20),
            percentage: Percent::from_f64(-13.33),
            rule_id: RuleId::new(),
            description: "Daily AI trading loss".to_string(),
            applied_at: Timestamp::now(),
        };
        store.apply_settlement(user, &update).unwrap();

        let account = store.get_account(user).unwrap();
        assert_eq!(account.balance, bal(130));
        let entry = account.ledger.last().unwrap();
        assert_eq!(entry.kind, EntryKind::Debit);
        assert_eq!(entry.amount, bal(20));
    }

    #[test]
    fn participants_lists_only_opted_in_users() {
        let mut store = InMemoryAccounts::new();
        let opted_in = UserId::new();
        let opted_out = UserId::new();
        store.create_account(opted_in).unwrap();
        store.create_account(opted_out).unwrap();
        store.set_participating(opted_in, true).unwrap();

        assert_eq!(store.participants(), vec![opted_in]);
    }

    #[test]
    fn deactivation_marks_every_participant() {
        let (mut store, user_a) = store_with_user(100, true);
        let user_b = UserId::new();
        store.create_account(user_b).unwrap();
        store.set_participating(user_b, true).unwrap();
        let bystander = UserId::new();
        store.create_account(bystander).unwrap();

        let affected = store
            .deactivate_participants("AI trading auto-deactivated", Timestamp::now())
            .unwrap();

        assert_eq!(affected.len(), 2);
        for user in [user_a, user_b] {
            let account = store.get_account(user).unwrap();
            assert!(!account.participating);
            let entry = account.ledger.last().unwrap();
            assert_eq!(entry.kind, EntryKind::System);
            assert_eq!(entry.amount, Balance::zero());
        }
        assert!(store.get_account(bystander).unwrap().ledger.is_empty());
    }

    #[test]
    fn ledger_is_append_only_and_ordered() {
        let (mut store, user) = store_with_user(0, false);
        for i in 1..=5 {
            store
                .adjust_balance(user, bal(i), EntryKind::Credit, "Deposit approved")
                .unwrap();
        }

        let account = store.get_account(user).unwrap();
        assert_eq!(account.ledger.len(), 5);
        for pair in account.ledger.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }
}
