use crate::types::balance::Balance;
use crate::types::ids::{EntryId, RuleId};
use crate::types::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry's effect on the balance. The sign lives
/// here, never in `amount`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Credit,
    Debit,
    /// Zero-effect audit marker (e.g. auto-deactivation).
    System,
}

/// Immutable ledger record. Entries are append-only per account and never
/// reordered; `amount` is an unsigned magnitude.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: EntryId,
    pub timestamp: Timestamp,
    pub kind: EntryKind,
    pub amount: Balance,
    pub description: String,
    pub rule_reference: Option<RuleId>,
    pub balance_after: Balance,
}

impl LedgerEntry {
    pub fn new(
        kind: EntryKind,
        amount: Balance,
        description: &str,
        rule_reference: Option<RuleId>,
        balance_after: Balance,
        timestamp: Timestamp,
    ) -> Self {
        debug_assert!(!amount.is_negative(), "ledger amounts are magnitudes");
        LedgerEntry {
            entry_id: EntryId::new(),
            timestamp,
            kind,
            amount,
            description: description.to_string(),
            rule_reference,
            balance_after,
        }
    }

    pub fn signed_amount(&self) -> Balance {
        match self.kind {
            EntryKind::Credit => self.amount,
            EntryKind::Debit => -self.amount,
            EntryKind::System => Balance::zero(),
        }
    }
}

/// Replay an account's ledger from zero. The result is the net effect of
/// every ledgered mutation; audit code compares it against the current
/// balance.
pub fn replay(entries: &[LedgerEntry]) -> Balance {
    entries
        .iter()
        .fold(Balance::zero(), |acc, e| acc.saturating_add(e.signed_amount()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: EntryKind, amount: i64) -> LedgerEntry {
        LedgerEntry::new(
            kind,
            Balance::from_i64(amount),
            "test",
            None,
            Balance::zero(),
            Timestamp::now(),
        )
    }

    #[test]
    fn sign_is_carried_by_kind() {
        assert_eq!(entry(EntryKind::Credit, 10).signed_amount(), Balance::from_i64(10));
        assert_eq!(entry(EntryKind::Debit, 10).signed_amount(), Balance::from_i64(-10));
        assert_eq!(entry(EntryKind::System, 0).signed_amount(), Balance::zero());
    }

    #[test]
    fn replay_nets_out_credits_and_debits() {
        let entries = vec![
            entry(EntryKind::Credit, 100),
            entry(EntryKind::Debit, 30),
            entry(EntryKind::System, 0),
            entry(EntryKind::Credit, 5),
        ];
        assert_eq!(replay(&entries), Balance::from_i64(75));
    }

    #[test]
    fn replay_saturates_instead_of_wrapping() {
        let entries = vec![
            entry(EntryKind::Credit, i64::MAX),
            entry(EntryKind::Credit, 1),
        ];
        assert_eq!(replay(&entries), Balance::from_i64(i64::MAX));
    }
}
