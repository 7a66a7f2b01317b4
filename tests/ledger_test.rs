mod common;

use std::sync::Arc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rewards_ledger::error::Error;
use rewards_ledger::interfaces::audit_log::AuditLog;
use rewards_ledger::interfaces::entry_store::{EntryFilter, EntryStore};
use rewards_ledger::invariants::checks::InvariantChecks;
use rewards_ledger::ledger::audit::AuditAction;
use rewards_ledger::ledger::entry::{EntryStatus, EntryType};
use rewards_ledger::ledger::service::LedgerService;
use rewards_ledger::ledger::store::MemoryLedgerStore;
use rewards_ledger::types::ids::UserId;

use common::{funded_service, new_service};

#[test]
fn mission_reward_lands_pending_then_available() {
    let (_, service) = new_service();
    let user = UserId::new();

    let credit = service
        .credit_mission_reward(user, dec!(25.00), "mission-7")
        .unwrap();
    assert_eq!(credit.status, EntryStatus::Pending);

    let balance = service.get_balance(user);
    assert_eq!(balance.pending, dec!(25.00));
    assert_eq!(balance.available, dec!(0));

    service.promote_to_available(credit.id).unwrap();
    let balance = service.get_balance(user);
    assert_eq!(balance.pending, dec!(0));
    assert_eq!(balance.available, dec!(25.00));
    assert_eq!(balance.total_paid, dec!(0));
}

#[test]
fn same_day_mission_replay_credits_once() {
    let (store, service) = new_service();
    let user = UserId::new();

    let first = service
        .credit_mission_reward(user, dec!(5.00), "mission-7")
        .unwrap();
    let replay = service
        .credit_mission_reward(user, dec!(5.00), "mission-7")
        .unwrap();
    assert_eq!(first.id, replay.id);

    let entries = store.list_by_user(user, &EntryFilter::any());
    assert_eq!(entries.len(), 1);
    assert_eq!(service.get_balance(user).pending, dec!(5.00));
}

#[test]
fn overdraw_is_rejected_and_leaves_balance_untouched() {
    let (store, service, user) = funded_service(dec!(25.00));

    let err = service
        .request_withdrawal_debit(user, dec!(30.00), "w-1")
        .unwrap_err();
    match err {
        Error::InsufficientBalance { requested, available } => {
            assert_eq!(requested, dec!(30.00));
            assert_eq!(available, dec!(25.00));
        }
        other => panic!("expected InsufficientBalance, got {other}"),
    }

    assert_eq!(service.get_balance(user).available, dec!(25.00));
    let debits = store.list_by_user(user, &EntryFilter::of(EntryType::Debit, EntryStatus::Pending));
    assert!(debits.is_empty());
}

#[test]
fn full_balance_withdrawal_replay_is_a_noop() {
    let (store, service, user) = funded_service(dec!(25.00));

    let hold = service
        .request_withdrawal_debit(user, dec!(25.00), "w-1")
        .unwrap();
    assert_eq!(service.get_balance(user).available, dec!(0));

    // A double-clicked submit retries the same key against a drained balance.
    let replay = service
        .request_withdrawal_debit(user, dec!(25.00), "w-1")
        .unwrap();
    assert_eq!(replay.id, hold.id);

    let debits = store.list_by_user(user, &EntryFilter::of(EntryType::Debit, EntryStatus::Pending));
    assert_eq!(debits.len(), 1);
    assert_eq!(service.get_balance(user).available, dec!(0));
}

#[test]
fn completed_debit_moves_funds_to_total_paid() {
    let (_, service, user) = funded_service(dec!(25.00));

    let hold = service
        .request_withdrawal_debit(user, dec!(25.00), "w-1")
        .unwrap();
    assert_eq!(service.get_balance(user).available, dec!(0));

    service
        .update_entry_status(hold.id, EntryStatus::Completed, "transfer confirmed")
        .unwrap();
    let balance = service.get_balance(user);
    assert_eq!(balance.available, dec!(0));
    assert_eq!(balance.total_paid, dec!(25.00));
}

#[test]
fn failed_debit_restores_available_funds() {
    let (_, service, user) = funded_service(dec!(25.00));

    let hold = service
        .request_withdrawal_debit(user, dec!(25.00), "w-1")
        .unwrap();
    service
        .update_entry_status(hold.id, EntryStatus::Failed, "provider rejected")
        .unwrap();

    let balance = service.get_balance(user);
    assert_eq!(balance.available, dec!(25.00));
    assert_eq!(balance.total_paid, dec!(0));
}

#[test]
fn concurrent_withdrawals_cannot_double_spend() {
    let (store, service, user) = funded_service(dec!(10.00));

    let mut handles = Vec::new();
    for i in 0..2 {
        let service = Arc::clone(&service);
        handles.push(std::thread::spawn(move || {
            service.request_withdrawal_debit(user, dec!(10.00), &format!("w-{i}"))
        }));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one withdrawal may win the race");
    for result in &results {
        if let Err(e) = result {
            assert!(matches!(
                e,
                Error::InsufficientBalance { .. } | Error::Conflict(_)
            ));
        }
    }

    assert_eq!(service.get_balance(user).available, dec!(0));
    InvariantChecks::check_no_negative_available(store.as_ref()).unwrap();
}

#[test]
fn terminal_statuses_reject_further_transitions() {
    let (_, service, user) = funded_service(dec!(25.00));

    let hold = service
        .request_withdrawal_debit(user, dec!(25.00), "w-1")
        .unwrap();
    service
        .update_entry_status(hold.id, EntryStatus::Completed, "transfer confirmed")
        .unwrap();

    for target in [
        EntryStatus::Pending,
        EntryStatus::Failed,
        EntryStatus::Reversed,
        EntryStatus::Available,
    ] {
        let err = service
            .update_entry_status(hold.id, target, "late mutation")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }
    assert_eq!(service.get_balance(user).total_paid, dec!(25.00));
}

#[test]
fn credits_never_enter_debit_states() {
    let (_, service) = new_service();
    let user = UserId::new();
    let credit = service
        .credit_mission_reward(user, dec!(5.00), "mission-1")
        .unwrap();

    for target in [EntryStatus::Completed, EntryStatus::Failed] {
        let err = service
            .update_entry_status(credit.id, target, "wrong lane")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }
}

#[test]
fn every_mutation_leaves_an_audit_trail() {
    let (store, service) = new_service();
    let user = UserId::new();

    let credit = service
        .credit_mission_reward(user, dec!(25.00), "mission-1")
        .unwrap();
    service.promote_to_available(credit.id).unwrap();
    let hold = service
        .request_withdrawal_debit(user, dec!(25.00), "w-1")
        .unwrap();
    service
        .update_entry_status(hold.id, EntryStatus::Completed, "transfer confirmed")
        .unwrap();

    let credit_trail = store.query_by_entry(&credit.id);
    assert_eq!(credit_trail.len(), 2);
    assert_eq!(credit_trail[0].action, AuditAction::CreditMissionReward);
    assert_eq!(credit_trail[0].from, None);
    assert_eq!(credit_trail[0].to, EntryStatus::Pending);
    assert_eq!(credit_trail[1].action, AuditAction::PromoteToAvailable);
    assert_eq!(credit_trail[1].from, Some(EntryStatus::Pending));
    assert_eq!(credit_trail[1].to, EntryStatus::Available);

    let debit_trail = store.query_by_entry(&hold.id);
    assert_eq!(debit_trail.len(), 2);
    assert_eq!(debit_trail[1].from, Some(EntryStatus::Pending));
    assert_eq!(debit_trail[1].to, EntryStatus::Completed);

    // Failed mutations must not leave records behind.
    let before = store.query_by_user(user).len();
    assert!(service
        .update_entry_status(hold.id, EntryStatus::Pending, "illegal")
        .is_err());
    assert_eq!(store.query_by_user(user).len(), before);

    InvariantChecks::check_audit_coverage(store.as_ref()).unwrap();
}

proptest! {
    /// Arbitrary interleavings of credits, promotions and withdrawals can
    /// never drive an available balance negative.
    #[test]
    fn available_balance_is_never_negative(
        ops in prop::collection::vec((0u8..3u8, 1u32..100u32), 1..40)
    ) {
        let store = Arc::new(MemoryLedgerStore::new());
        let service = LedgerService::new(Arc::clone(&store), Default::default());
        let user = UserId::new();

        for (i, (op, value)) in ops.into_iter().enumerate() {
            let amount = Decimal::from(value);
            match op {
                0 => {
                    let _ = service.credit_mission_reward(user, amount, &format!("m-{i}"));
                }
                1 => {
                    let pending = store.list_by_user(
                        user,
                        &EntryFilter::of(EntryType::Credit, EntryStatus::Pending),
                    );
                    if let Some(entry) = pending.first() {
                        service.promote_to_available(entry.id).unwrap();
                    }
                }
                _ => {
                    let _ = service.request_withdrawal_debit(user, amount, &format!("w-{i}"));
                }
            }
            prop_assert!(service.get_balance(user).available >= Decimal::ZERO);
        }

        prop_assert!(InvariantChecks::check_no_negative_available(store.as_ref()).is_ok());
        prop_assert!(InvariantChecks::check_audit_coverage(store.as_ref()).is_ok());
    }
}
