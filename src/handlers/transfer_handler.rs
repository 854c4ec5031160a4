//! Transfer Handler
//!
//! Moves coins between two accounts. The funds check, both balance writes and
//! the ledger append run inside one unit of work with both rows locked.

use std::sync::Arc;

use crate::domain::{Amount, DomainError, NewLedgerEntry, OperationContext};
use crate::store::{ShopStore, StoreError};

use super::{TransferCommand, TransferResult};

/// Handler for coin transfers
#[derive(Clone)]
pub struct TransferHandler {
    store: Arc<dyn ShopStore>,
}

impl TransferHandler {
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self { store }
    }

    /// Execute the transfer command
    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferResult, DomainError> {
        let amount = Amount::new(command.amount).map_err(|_| DomainError::InvalidAmount)?;

        let to_username = command.to_username.trim();
        if to_username.is_empty() {
            return Err(DomainError::InvalidRecipient(
                "recipient username must not be empty".to_string(),
            ));
        }

        if self.store.find_account(command.from_account_id).await?.is_none() {
            return Err(DomainError::AccountNotFound(command.from_account_id));
        }

        // Usernames never change, so resolving the recipient outside the
        // unit of work is safe; the row itself is locked below.
        let recipient = self
            .store
            .find_account_by_username(to_username)
            .await?
            .ok_or_else(|| DomainError::RecipientNotFound(to_username.to_string()))?;

        if recipient.id == command.from_account_id {
            return Err(DomainError::InvalidRecipient(
                "cannot send coins to yourself".to_string(),
            ));
        }

        let mut uow = self.store.begin().await?;
        let locked = uow
            .lock_accounts(&[command.from_account_id, recipient.id])
            .await?;

        let sender = locked
            .iter()
            .find(|a| a.id == command.from_account_id)
            .ok_or(DomainError::AccountNotFound(command.from_account_id))?;
        let receiver = locked
            .iter()
            .find(|a| a.id == recipient.id)
            .ok_or_else(|| DomainError::RecipientNotFound(to_username.to_string()))?;

        if !sender.balance.is_sufficient_for(&amount) {
            tracing::warn!(
                from = %sender.id,
                to = %receiver.id,
                amount = amount.value(),
                balance = sender.balance.value(),
                caller = ?context.account_id,
                correlation_id = ?context.correlation_id,
                "Transfer rejected: insufficient funds"
            );
            return Err(DomainError::insufficient_funds(
                amount.value(),
                sender.balance.value(),
            ));
        }

        let sender_balance = sender
            .balance
            .debit(&amount)
            .map_err(|_| DomainError::insufficient_funds(amount.value(), sender.balance.value()))?;
        let receiver_balance = receiver
            .balance
            .credit(&amount)
            .map_err(|e| StoreError::InvariantViolation(e.to_string()))?;

        uow.set_balance(sender.id, sender_balance).await?;
        uow.set_balance(receiver.id, receiver_balance).await?;
        let entry = uow
            .append_ledger_entry(NewLedgerEntry::transfer(sender.id, receiver.id, amount))
            .await?;
        uow.commit().await?;

        tracing::info!(
            entry_id = entry.id,
            from = %command.from_account_id,
            to = %recipient.id,
            amount = amount.value(),
            caller = ?context.account_id,
            correlation_id = ?context.correlation_id,
            "Transfer completed"
        );

        Ok(TransferResult {
            entry_id: entry.id,
            from_account_id: command.from_account_id,
            to_account_id: recipient.id,
            amount: amount.value(),
            sender_balance: sender_balance.value(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Balance;
    use crate::store::InMemoryStore;
    use uuid::Uuid;

    async fn setup() -> (InMemoryStore, TransferHandler, Uuid, Uuid) {
        let store = InMemoryStore::new();
        let a = store
            .create_account("alice", "h", Balance::new(1000).unwrap())
            .await
            .unwrap();
        let b = store
            .create_account("bob", "h", Balance::new(1000).unwrap())
            .await
            .unwrap();
        let handler = TransferHandler::new(Arc::new(store.clone()));
        (store, handler, a.id, b.id)
    }

    async fn balance(store: &InMemoryStore, id: Uuid) -> i64 {
        store.find_account(id).await.unwrap().unwrap().balance.value()
    }

    #[tokio::test]
    async fn test_transfer_moves_coins() {
        let (store, handler, a, b) = setup().await;

        let result = handler
            .execute(TransferCommand::new(a, "bob", 100), &OperationContext::new())
            .await
            .unwrap();

        assert_eq!(result.sender_balance, 900);
        assert_eq!(result.to_account_id, b);
        assert_eq!(balance(&store, a).await, 900);
        assert_eq!(balance(&store, b).await, 1100);
    }

    #[tokio::test]
    async fn test_recipient_is_trimmed() {
        let (store, handler, a, b) = setup().await;

        handler
            .execute(TransferCommand::new(a, "  bob\t", 1), &OperationContext::new())
            .await
            .unwrap();
        assert_eq!(balance(&store, b).await, 1001);
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let (_, handler, a, _) = setup().await;

        for amount in [0, -5] {
            let err = handler
                .execute(TransferCommand::new(a, "bob", amount), &OperationContext::new())
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidAmount));
        }
    }

    #[tokio::test]
    async fn test_blank_recipient_rejected() {
        let (_, handler, a, _) = setup().await;

        let err = handler
            .execute(TransferCommand::new(a, "   ", 1), &OperationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRecipient(_)));
    }

    #[tokio::test]
    async fn test_unknown_recipient() {
        let (_, handler, a, _) = setup().await;

        let err = handler
            .execute(TransferCommand::new(a, "carol", 1), &OperationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RecipientNotFound(name) if name == "carol"));
    }

    #[tokio::test]
    async fn test_unknown_sender() {
        let (_, handler, _, _) = setup().await;
        let ghost = Uuid::new_v4();

        let err = handler
            .execute(TransferCommand::new(ghost, "bob", 1), &OperationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AccountNotFound(id) if id == ghost));
    }

    #[tokio::test]
    async fn test_unknown_sender_checked_before_recipient() {
        let (_, handler, _, _) = setup().await;
        let ghost = Uuid::new_v4();

        let err = handler
            .execute(TransferCommand::new(ghost, "carol", 1), &OperationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AccountNotFound(id) if id == ghost));
    }

    #[tokio::test]
    async fn test_insufficient_funds_mutates_nothing() {
        let (store, handler, a, b) = setup().await;

        let err = handler
            .execute(TransferCommand::new(a, "bob", 1001), &OperationContext::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::InsufficientFunds {
                required: 1001,
                available: 1000
            }
        ));
        assert_eq!(balance(&store, a).await, 1000);
        assert_eq!(balance(&store, b).await, 1000);
        assert!(store.ledger_entries_for(a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_whole_balance_can_be_sent() {
        let (store, handler, a, _) = setup().await;

        handler
            .execute(TransferCommand::new(a, "bob", 1000), &OperationContext::new())
            .await
            .unwrap();
        assert_eq!(balance(&store, a).await, 0);
    }

    #[tokio::test]
    async fn test_self_transfer_rejected() {
        let (store, handler, a, _) = setup().await;

        let err = handler
            .execute(TransferCommand::new(a, "alice", 10), &OperationContext::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidRecipient(_)));
        assert_eq!(balance(&store, a).await, 1000);
        assert!(store.ledger_entries_for(a).await.unwrap().is_empty());
    }
}
