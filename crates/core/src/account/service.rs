//! Account registry.

use std::sync::Arc;

use accounts_shared::types::{AccountId, PageResponse};
use tracing::{info, warn};

use super::allocator::AccountNumberAllocator;
use super::types::{Account, AccountPatch, NewAccount};
use crate::clock::Clock;
use crate::ledger::LedgerError;
use crate::store::{AccountQuery, LedgerStore, StoreTx};

/// Opens, updates, deletes and lists accounts.
pub struct AccountService<S> {
    store: Arc<S>,
    allocator: AccountNumberAllocator,
    clock: Arc<dyn Clock>,
}

impl<S: LedgerStore> AccountService<S> {
    /// Creates a service over `store`.
    pub fn new(store: Arc<S>, allocator: AccountNumberAllocator, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            allocator,
            clock,
        }
    }

    /// Opens an account for an existing customer under a freshly allocated number.
    pub async fn open(&self, input: NewAccount) -> Result<Account, LedgerError> {
        let mut tx = self.store.begin().await?;
        if tx.load_customer(input.customer_id).await?.is_none() {
            return Err(LedgerError::CustomerNotFound(input.customer_id.into_inner()));
        }

        let number = self.allocator.allocate(&mut tx).await?;
        let account = Account::open(input, number, self.clock.now());

        let taken = |e| LedgerError::from_unique_violation(e, "", &account.number);
        tx.save_account(&account).await.map_err(taken)?;
        tx.commit().await.map_err(taken)?;

        info!(
            account_id = %account.id,
            customer_id = %account.customer_id,
            number = %account.number,
            kind = %account.kind,
            "account opened"
        );
        Ok(account)
    }

    /// Fetches an account.
    pub async fn get(&self, id: AccountId) -> Result<Account, LedgerError> {
        let mut tx = self.store.begin().await?;
        tx.load_account(id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id.into_inner()))
    }

    /// Updates kind and status. Number, owner and balances are untouched.
    pub async fn patch(&self, id: AccountId, patch: AccountPatch) -> Result<Account, LedgerError> {
        let mut tx = self.store.begin().await?;
        let mut account = tx
            .lock_account(id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id.into_inner()))?;

        account.apply(patch, self.clock.now());
        tx.save_account(&account).await?;
        tx.commit().await?;
        Ok(account)
    }

    /// Deletes an account that owns no movements.
    pub async fn delete(&self, id: AccountId) -> Result<(), LedgerError> {
        let mut tx = self.store.begin().await?;
        if tx.lock_account(id).await?.is_none() {
            return Err(LedgerError::AccountNotFound(id.into_inner()));
        }

        let count = tx.count_movements_for_account(id).await?;
        if count > 0 {
            warn!(account_id = %id, count, "account deletion rejected: has movements");
            return Err(LedgerError::HasDependents {
                resource: "account",
                id: id.into_inner(),
                count,
            });
        }

        tx.delete_account(id).await?;
        tx.commit().await?;
        info!(account_id = %id, "account deleted");
        Ok(())
    }

    /// Lists accounts, ordered by number.
    pub async fn list(&self, query: &AccountQuery) -> Result<PageResponse<Account>, LedgerError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.list_accounts(query).await?)
    }
}
