//! End-to-end daily cycle: tiered rules, a mixed population of accounts,
//! one settlement run, then the deactivation run.

use std::sync::Arc;

use tokio::sync::RwLock;

use SettleInfra::interfaces::account_store::AccountStore;
use SettleInfra::rules::RuleTable;
use SettleInfra::settlement::engine::{LOSS_DESCRIPTION, PROFIT_DESCRIPTION};
use SettleInfra::settlement::ledger::EntryKind;
use SettleInfra::settlement::{DeactivationEngine, InMemoryAccounts, SettlementEngine};
use SettleInfra::types::balance::Balance;
use SettleInfra::types::ids::UserId;
use SettleInfra::types::percent::Percent;

fn bal(v: i64) -> Balance {
    Balance::from_i64(v)
}

fn funded_participant(store: &mut InMemoryAccounts, balance: i64) -> UserId {
    let user = UserId::new();
    store.create_account(user).unwrap();
    if balance != 0 {
        store
            .adjust_balance(user, bal(balance), EntryKind::Credit, "Deposit approved")
            .unwrap();
    }
    store.set_participating(user, true).unwrap();
    user
}

#[tokio::test]
async fn full_daily_cycle() {
    let mut rules = RuleTable::new();
    rules.create(bal(100), bal(500), bal(10)).unwrap();
    rules.create(bal(501), bal(2_000), bal(-25)).unwrap();
    let rules = Arc::new(RwLock::new(rules));

    let mut store = InMemoryAccounts::new();
    let winner = funded_participant(&mut store, 150);
    let loser = funded_participant(&mut store, 1_000);
    let unmatched = funded_participant(&mut store, 50);
    let spectator = UserId::new();
    store.create_account(spectator).unwrap();

    // Settlement.
    let settlement = SettlementEngine::new(Arc::clone(&rules));
    let summary = settlement.run(&mut store).await.unwrap();

    assert_eq!(summary.users_processed, 3);
    assert_eq!(summary.users_updated, 2);
    assert_eq!(summary.users_failed, 0);
    assert_eq!(summary.total_delta, bal(-15));

    let account = store.get_account(winner).unwrap();
    assert_eq!(account.balance, bal(160));
    assert_eq!(account.profit_stats.last_percentage, Percent::from_f64(6.67));
    assert_eq!(account.ledger.last().unwrap().description, PROFIT_DESCRIPTION);

    let account = store.get_account(loser).unwrap();
    assert_eq!(account.balance, bal(975));
    assert_eq!(account.profit_stats.last_percentage, Percent::from_f64(-2.5));
    let entry = account.ledger.last().unwrap();
    assert_eq!(entry.kind, EntryKind::Debit);
    assert_eq!(entry.amount, bal(25));
    assert_eq!(entry.description, LOSS_DESCRIPTION);

    let account = store.get_account(unmatched).unwrap();
    assert_eq!(account.balance, bal(50));
    assert_eq!(account.ledger.len(), 1);
    assert_eq!(account.profit_stats.last_profit, Balance::zero());

    assert!(store.get_account(spectator).unwrap().ledger.is_empty());

    // Every settled mutation is replayable from the ledger.
    for user in [winner, loser, unmatched] {
        assert!(store.verify_ledger(user).unwrap());
    }

    // Deactivation runs one minute later and clears participation.
    let deactivation = DeactivationEngine::new();
    let summary = deactivation.run(&mut store).unwrap();
    assert_eq!(summary.users_deactivated, 3);

    for user in [winner, loser, unmatched] {
        let account = store.get_account(user).unwrap();
        assert!(!account.participating);
        let marker = account.ledger.last().unwrap();
        assert_eq!(marker.kind, EntryKind::System);
        assert_eq!(marker.amount, Balance::zero());
    }

    // The next cycle finds nobody participating.
    let summary = settlement.run(&mut store).await.unwrap();
    assert_eq!(summary.users_processed, 0);
}

#[tokio::test]
async fn rule_changes_between_cycles_apply_to_the_next_cycle() {
    let mut table = RuleTable::new();
    let rule = table.create(bal(0), bal(10_000), bal(10)).unwrap();
    let rules = Arc::new(RwLock::new(table));

    let mut store = InMemoryAccounts::new();
    let user = funded_participant(&mut store, 100);

    let engine = SettlementEngine::new(Arc::clone(&rules));
    engine.run(&mut store).await.unwrap();
    assert_eq!(store.get_account(user).unwrap().balance, bal(110));

    rules
        .write()
        .await
        .update(rule.rule_id, bal(0), bal(10_000), bal(40))
        .unwrap();

    engine.run(&mut store).await.unwrap();
    assert_eq!(store.get_account(user).unwrap().balance, bal(150));
}
