//! Ledger Integration Tests
//!
//! Transfers, purchases and projections against the in-memory store.

use std::sync::Arc;

use merch_shop::domain::{DomainError, OperationContext, INITIAL_BALANCE, STORE_LABEL};
use merch_shop::handlers::{PurchaseCommand, TransferCommand};
use merch_shop::projection::{InventoryItem, ReceivedCoins, SentCoins};
use merch_shop::store::{InMemoryStore, ShopStore};
use tokio_test::{assert_err, assert_ok};

mod common;

use common::{provision, Ledger};

fn ledger() -> Ledger {
    let store: Arc<dyn ShopStore> = Arc::new(InMemoryStore::new());
    Ledger::new(store)
}

#[tokio::test]
async fn test_transfer_then_purchase_scenario() {
    let ledger = ledger();
    let ctx = OperationContext::new();
    let a = provision(&ledger.store, "alice").await;
    let b = provision(&ledger.store, "bob").await;

    ledger
        .transfers
        .execute(TransferCommand::new(a, "bob", 100), &ctx)
        .await
        .unwrap();
    assert_eq!(ledger.balance(a).await, 900);
    assert_eq!(ledger.balance(b).await, 1100);

    ledger
        .purchases
        .execute(PurchaseCommand::new(b, "cup"), &ctx)
        .await
        .unwrap();
    assert_eq!(ledger.balance(b).await, 1080);

    let info_b = ledger.projection.account_info(b).await.unwrap();
    assert_eq!(info_b.coins, 1080);
    assert_eq!(
        info_b.inventory,
        vec![InventoryItem {
            item_type: "cup".into(),
            quantity: 1
        }]
    );
    assert_eq!(
        info_b.coin_history.sent,
        vec![SentCoins {
            to_user: STORE_LABEL.into(),
            amount: 20
        }]
    );
    assert_eq!(
        info_b.coin_history.received,
        vec![ReceivedCoins {
            from_user: "alice".into(),
            amount: 100
        }]
    );

    let info_a = ledger.projection.account_info(a).await.unwrap();
    assert_eq!(
        info_a.coin_history.sent,
        vec![SentCoins {
            to_user: "bob".into(),
            amount: 100
        }]
    );
    assert!(info_a.coin_history.received.is_empty());
    assert!(info_a.inventory.is_empty());
}

#[tokio::test]
async fn test_repeated_purchases_aggregate() {
    let ledger = ledger();
    let ctx = OperationContext::new();
    let a = provision(&ledger.store, "alice").await;

    for item in ["pen", "socks", "pen"] {
        ledger
            .purchases
            .execute(PurchaseCommand::new(a, item), &ctx)
            .await
            .unwrap();
    }

    let info = ledger.projection.account_info(a).await.unwrap();
    assert_eq!(info.coins, INITIAL_BALANCE - 30);
    assert_eq!(
        info.inventory,
        vec![
            InventoryItem {
                item_type: "pen".into(),
                quantity: 2
            },
            InventoryItem {
                item_type: "socks".into(),
                quantity: 1
            },
        ]
    );
    assert_eq!(info.coin_history.sent.len(), 3);
}

#[tokio::test]
async fn test_invalid_item_mutates_nothing() {
    let ledger = ledger();
    let a = provision(&ledger.store, "alice").await;

    let err = ledger
        .purchases
        .execute(PurchaseCommand::new(a, "car"), &OperationContext::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidItem(_)));

    assert_eq!(ledger.balance(a).await, INITIAL_BALANCE);
    assert!(ledger.store.purchases_for(a).await.unwrap().is_empty());
    assert!(ledger.store.ledger_entries_for(a).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_positive_amount_mutates_nothing() {
    let ledger = ledger();
    let a = provision(&ledger.store, "alice").await;
    let b = provision(&ledger.store, "bob").await;

    for amount in [0, -5] {
        let err = ledger
            .transfers
            .execute(TransferCommand::new(a, "bob", amount), &OperationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidAmount));
    }

    assert_eq!(ledger.balance(a).await, INITIAL_BALANCE);
    assert_eq!(ledger.balance(b).await, INITIAL_BALANCE);
    assert!(ledger.store.ledger_entries_for(a).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insufficient_funds_mutates_nothing() {
    let ledger = ledger();
    let a = provision(&ledger.store, "alice").await;
    let b = provision(&ledger.store, "bob").await;

    let err = ledger
        .transfers
        .execute(
            TransferCommand::new(a, "bob", INITIAL_BALANCE + 1),
            &OperationContext::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InsufficientFunds { .. }));

    assert_eq!(ledger.balance(a).await, INITIAL_BALANCE);
    assert_eq!(ledger.balance(b).await, INITIAL_BALANCE);
}

#[tokio::test]
async fn test_self_transfer_rejected() {
    let ledger = ledger();
    let a = provision(&ledger.store, "alice").await;

    let err = ledger
        .transfers
        .execute(TransferCommand::new(a, "alice", 10), &OperationContext::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidRecipient(_)));
    assert_eq!(ledger.balance(a).await, INITIAL_BALANCE);
    assert!(ledger.store.ledger_entries_for(a).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_recipient() {
    let ledger = ledger();
    let a = provision(&ledger.store, "alice").await;

    let err = ledger
        .transfers
        .execute(TransferCommand::new(a, "nobody", 10), &OperationContext::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::RecipientNotFound(_)));
    assert_eq!(ledger.balance(a).await, INITIAL_BALANCE);
}

#[tokio::test]
async fn test_spending_exact_balance() {
    let ledger = ledger();
    let a = provision(&ledger.store, "alice").await;
    provision(&ledger.store, "bob").await;

    let result = assert_ok!(
        ledger
            .transfers
            .execute(
                TransferCommand::new(a, "bob", INITIAL_BALANCE),
                &OperationContext::new(),
            )
            .await
    );
    assert_eq!(result.sender_balance, 0);
    assert_eq!(ledger.balance(a).await, 0);

    let err = assert_err!(
        ledger
            .purchases
            .execute(PurchaseCommand::new(a, "pen"), &OperationContext::new())
            .await
    );
    assert!(matches!(err, DomainError::InsufficientFunds { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overdraw_is_impossible() {
    let ledger = ledger();
    let a = provision(&ledger.store, "alice").await;
    let b = provision(&ledger.store, "bob").await;

    // Each transfer passes the check against the initial balance on its own,
    // but only three fit together.
    let amount = 300;
    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let transfers = ledger.transfers.clone();
            tokio::spawn(async move {
                transfers
                    .execute(TransferCommand::new(a, "bob", amount), &OperationContext::new())
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(DomainError::InsufficientFunds { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(succeeded, INITIAL_BALANCE / amount);
    assert_eq!(ledger.balance(a).await, INITIAL_BALANCE - succeeded * amount);
    assert_eq!(ledger.balance(b).await, INITIAL_BALANCE + succeeded * amount);
    assert_eq!(ledger.replayed_balance(a).await, ledger.balance(a).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_conservation_and_agreement_under_concurrency() {
    let ledger = ledger();
    let names = ["a", "b", "c", "d", "e"];
    let mut ids = Vec::new();
    for name in names {
        ids.push(provision(&ledger.store, name).await);
    }

    let mut tasks = Vec::new();
    for round in 0..200usize {
        let from = ids[round % ids.len()];
        let to = names[(round * 3 + 1) % names.len()];
        let amount = (round % 7 + 1) as i64 * 40;
        let transfers = ledger.transfers.clone();
        tasks.push(tokio::spawn(async move {
            transfers
                .execute(TransferCommand::new(from, to, amount), &OperationContext::new())
                .await
        }));
    }
    for task in tasks {
        match task.await.unwrap() {
            Ok(_)
            | Err(DomainError::InsufficientFunds { .. })
            | Err(DomainError::InvalidRecipient(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    let mut total = 0;
    for id in &ids {
        let balance = ledger.balance(*id).await;
        assert!(balance >= 0);
        assert_eq!(ledger.replayed_balance(*id).await, balance);
        total += balance;
    }
    assert_eq!(total, INITIAL_BALANCE * ids.len() as i64);
}

#[tokio::test]
async fn test_agreement_after_mixed_operations() {
    let ledger = ledger();
    let ctx = OperationContext::new();
    let a = provision(&ledger.store, "alice").await;
    let b = provision(&ledger.store, "bob").await;

    ledger
        .transfers
        .execute(TransferCommand::new(a, "bob", 250), &ctx)
        .await
        .unwrap();
    ledger
        .purchases
        .execute(PurchaseCommand::new(b, "hoody"), &ctx)
        .await
        .unwrap();
    ledger
        .transfers
        .execute(TransferCommand::new(b, "alice", 75), &ctx)
        .await
        .unwrap();
    ledger
        .purchases
        .execute(PurchaseCommand::new(a, "umbrella"), &ctx)
        .await
        .unwrap();

    for id in [a, b] {
        assert_eq!(ledger.replayed_balance(id).await, ledger.balance(id).await);
    }
    assert_eq!(ledger.balance(a).await, 1000 - 250 + 75 - 200);
    assert_eq!(ledger.balance(b).await, 1000 + 250 - 300 - 75);
}
