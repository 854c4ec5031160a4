//! Purchase Handler
//!
//! Buys one catalog item: debit, purchase record and ledger entry are
//! written in one unit of work.

use std::sync::Arc;

use crate::domain::{catalog, DomainError, NewLedgerEntry, OperationContext};
use crate::store::ShopStore;

use super::{PurchaseCommand, PurchaseResult};

/// Handler for item purchases
#[derive(Clone)]
pub struct PurchaseHandler {
    store: Arc<dyn ShopStore>,
}

impl PurchaseHandler {
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self { store }
    }

    /// Execute the purchase command
    pub async fn execute(
        &self,
        command: PurchaseCommand,
        context: &OperationContext,
    ) -> Result<PurchaseResult, DomainError> {
        let item_name = command.item_name.trim();
        let item = catalog::lookup(item_name)
            .ok_or_else(|| DomainError::InvalidItem(item_name.to_string()))?;

        let mut uow = self.store.begin().await?;
        let locked = uow.lock_accounts(&[command.account_id]).await?;
        let buyer = locked
            .into_iter()
            .next()
            .ok_or(DomainError::AccountNotFound(command.account_id))?;

        if !buyer.balance.is_sufficient_for(&item.price) {
            tracing::warn!(
                account = %buyer.id,
                item = item.name,
                price = item.price.value(),
                balance = buyer.balance.value(),
                caller = ?context.account_id,
                correlation_id = ?context.correlation_id,
                "Purchase rejected: insufficient funds"
            );
            return Err(DomainError::insufficient_funds(
                item.price.value(),
                buyer.balance.value(),
            ));
        }

        let balance = buyer.balance.debit(&item.price).map_err(|_| {
            DomainError::insufficient_funds(item.price.value(), buyer.balance.value())
        })?;

        uow.set_balance(buyer.id, balance).await?;
        let purchase = uow.append_purchase(buyer.id, item.name, 1).await?;
        let entry = uow
            .append_ledger_entry(NewLedgerEntry::purchase(buyer.id, item.price))
            .await?;
        uow.commit().await?;

        tracing::info!(
            entry_id = entry.id,
            account = %buyer.id,
            item = item.name,
            price = item.price.value(),
            caller = ?context.account_id,
            correlation_id = ?context.correlation_id,
            "Purchase completed"
        );

        Ok(PurchaseResult {
            entry_id: entry.id,
            purchase_id: purchase.id,
            account_id: buyer.id,
            item_name: purchase.item_name,
            price: item.price.value(),
            balance: balance.value(),
        })
    }
}
