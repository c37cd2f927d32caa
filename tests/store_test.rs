mod common;

use checkout_sync::domain::id::{DedupKey, OrderId, TransactionId};
use checkout_sync::domain::order::{PaymentMethod, PaymentStatus, Settlement};
use checkout_sync::domain::store::{DedupLedger, OrderStore, SettleOutcome};
use checkout_sync::infra::memory::{InMemoryDedupLedger, InMemoryOrderStore};
use chrono::Utc;
use common::make_order;

fn approved(txn: &str) -> Settlement {
    Settlement::Approved {
        transaction_id: TransactionId::new(txn),
    }
}

// ── dedup ledger ──────────────────────────────────────────────────────────

#[test]
fn ledger_claims_each_key_once() {
    let ledger = InMemoryDedupLedger::new();
    let order = OrderId::new("ORD-1").unwrap();
    let key = DedupKey::new(&order, TransactionId::new("T-1").as_ref());

    assert!(!ledger.has_processed(&key));
    assert!(ledger.claim(key.clone()));
    assert!(!ledger.claim(key.clone()));
    assert!(ledger.has_processed(&key));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn ledger_keys_differ_by_transaction() {
    let ledger = InMemoryDedupLedger::new();
    let order = OrderId::new("ORD-2").unwrap();

    ledger.mark_processed(DedupKey::new(&order, None));
    assert!(ledger.has_processed(&DedupKey::new(&order, None)));
    assert!(!ledger.has_processed(&DedupKey::new(&order, TransactionId::new("T-2").as_ref())));
    assert!(ledger.claim(DedupKey::new(&order, TransactionId::new("T-2").as_ref())));
}

// ── order store ───────────────────────────────────────────────────────────

#[test]
fn settle_prefers_stored_order_over_candidate() {
    let store = InMemoryOrderStore::new();
    let stored = make_order("ORD-3-AAAAAA", 4);
    store.insert(stored.clone());
    assert!(store.contains(stored.order_id()));

    let candidate = make_order("ORD-3-AAAAAA", 1);
    let SettleOutcome::Settled(settled) = store.settle(candidate, &approved("T-3"), Utc::now()).unwrap()
    else {
        panic!("expected Settled");
    };
    assert_eq!(settled.quantity(), 4);
    assert_eq!(settled.payment_status(), PaymentStatus::Completed);
    assert_eq!(store.get(stored.order_id()).unwrap(), settled);
}

#[test]
fn settle_inserts_unknown_candidate() {
    let store = InMemoryOrderStore::new();
    let candidate = make_order("ORD-4-AAAAAA", 2);

    let outcome = store.settle(candidate.clone(), &approved("T-4"), Utc::now()).unwrap();
    assert!(matches!(outcome, SettleOutcome::Settled(_)));
    assert_eq!(store.len(), 1);
    assert!(store.contains(candidate.order_id()));
}

#[test]
fn settle_never_overwrites_terminal_state() {
    let store = InMemoryOrderStore::new();
    let order = make_order("ORD-5-AAAAAA", 1);
    store.insert(order.clone());

    store
        .settle(order.clone(), &Settlement::Declined { transaction_id: None }, Utc::now())
        .unwrap();
    let outcome = store.settle(order.clone(), &approved("T-5"), Utc::now()).unwrap();

    let SettleOutcome::AlreadySettled(recorded) = outcome else {
        panic!("expected AlreadySettled");
    };
    assert_eq!(recorded.payment_status(), PaymentStatus::Failed);
    assert!(recorded.paid_at().is_none());
}

#[test]
fn settle_rejects_terminal_candidate_without_storing_it() {
    let store = InMemoryOrderStore::new();
    let mut candidate = make_order("ORD-6-AAAAAA", 1);
    candidate.settle(&approved("T-6"), Utc::now()).unwrap();

    let outcome = store.settle(candidate, &approved("T-6b"), Utc::now()).unwrap();
    assert!(matches!(outcome, SettleOutcome::AlreadySettled(_)));
    assert!(store.is_empty());
}

#[test]
fn settle_leaves_stored_bank_transfer_order_alone() {
    let store = InMemoryOrderStore::new();
    let order = make_order("ORD-7-AAAAAA", 2).with_payment_method(PaymentMethod::BankTransfer);
    store.insert(order.clone());

    let candidate = make_order("ORD-7-AAAAAA", 2);
    let outcome = store.settle(candidate, &approved("T-7"), Utc::now()).unwrap();

    let SettleOutcome::NotGatewayPaid(recorded) = outcome else {
        panic!("expected NotGatewayPaid");
    };
    assert_eq!(recorded.payment_status(), PaymentStatus::Pending);
    assert_eq!(store.get(order.order_id()).unwrap(), order);
}
