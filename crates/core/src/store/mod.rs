//! Persistence seams for customers, accounts and movements.
//!
//! Every service works inside a [`StoreTx`] obtained from a [`LedgerStore`].
//! A transaction sees its own writes, holds the account locks it acquired
//! until it ends, and publishes nothing until [`StoreTx::commit`] succeeds.
//! Dropping a transaction without committing discards it.

mod memory;

pub use memory::{InMemoryStore, InMemoryTx};

use accounts_shared::types::{AccountId, CustomerId, MovementId, PageRequest, PageResponse};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::Account;
use crate::customer::Customer;
use crate::ledger::Movement;

/// Errors raised by a store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation {
        /// Name of the violated constraint.
        constraint: String,
    },

    /// The write lost a race with a concurrent transaction.
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    /// A referential rule rejected the write.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Backend failure.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether retrying the whole operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Unique constraint on account numbers.
pub const ACCOUNT_NUMBER_CONSTRAINT: &str = "accounts_number_key";

/// Unique constraint on customer identification codes.
pub const CUSTOMER_IDENTIFICATION_CONSTRAINT: &str = "customers_identification_key";

/// Filter for listing customers.
#[derive(Debug, Clone, Default)]
pub struct CustomerQuery {
    /// Case-insensitive match on name or identification.
    pub search: Option<String>,
    /// Page to return.
    pub page: PageRequest,
}

/// Filter for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountQuery {
    /// Restrict to one owner.
    pub customer_id: Option<CustomerId>,
    /// Case-insensitive match on account number.
    pub search: Option<String>,
    /// Page to return.
    pub page: PageRequest,
}

/// Filter for listing movements.
#[derive(Debug, Clone, Default)]
pub struct MovementQuery {
    /// Restrict to one account.
    pub account_id: Option<AccountId>,
    /// Inclusive lower bound on `occurred_at`.
    pub from: Option<NaiveDateTime>,
    /// Inclusive upper bound on `occurred_at`.
    pub to: Option<NaiveDateTime>,
    /// Page to return.
    pub page: PageRequest,
}

/// Factory of store transactions.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Transaction type produced by this store.
    type Tx: StoreTx;

    /// Opens a new transaction.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// Unit of work against the store.
#[async_trait]
pub trait StoreTx: Send {
    // ========== Customers ==========

    /// Loads a customer by id.
    async fn load_customer(&mut self, id: CustomerId) -> Result<Option<Customer>, StoreError>;

    /// Finds a customer by identification code.
    async fn find_customer_by_identification(
        &mut self,
        identification: &str,
    ) -> Result<Option<Customer>, StoreError>;

    /// Inserts or replaces a customer.
    async fn save_customer(&mut self, customer: &Customer) -> Result<(), StoreError>;

    /// Removes a customer.
    async fn delete_customer(&mut self, id: CustomerId) -> Result<(), StoreError>;

    /// Lists customers, ordered by name.
    async fn list_customers(
        &mut self,
        query: &CustomerQuery,
    ) -> Result<PageResponse<Customer>, StoreError>;

    // ========== Accounts ==========

    /// Loads an account by id without locking it.
    async fn load_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Loads an account and holds its exclusive lock until the transaction ends.
    async fn lock_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Inserts or replaces an account.
    async fn save_account(&mut self, account: &Account) -> Result<(), StoreError>;

    /// Removes an account.
    async fn delete_account(&mut self, id: AccountId) -> Result<(), StoreError>;

    /// Whether any account carries `number`.
    async fn account_exists_by_number(&mut self, number: &str) -> Result<bool, StoreError>;

    /// Every assigned account number.
    async fn list_account_numbers(&mut self) -> Result<Vec<String>, StoreError>;

    /// Accounts owned by a customer, ordered by number.
    async fn list_accounts_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Vec<Account>, StoreError>;

    /// Number of accounts owned by a customer.
    async fn count_accounts_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<u64, StoreError>;

    /// Lists accounts, ordered by number.
    async fn list_accounts(
        &mut self,
        query: &AccountQuery,
    ) -> Result<PageResponse<Account>, StoreError>;

    // ========== Movements ==========

    /// Loads a movement by id.
    async fn load_movement(&mut self, id: MovementId) -> Result<Option<Movement>, StoreError>;

    /// Inserts a movement.
    async fn save_movement(&mut self, movement: &Movement) -> Result<(), StoreError>;

    /// Removes a movement.
    async fn delete_movement(&mut self, id: MovementId) -> Result<(), StoreError>;

    /// Sum of debit amounts posted to `account_id` on the local calendar `date`.
    async fn sum_debits_for_account_on_date(
        &mut self,
        account_id: AccountId,
        date: NaiveDate,
    ) -> Result<Decimal, StoreError>;

    /// Number of movements attached to an account.
    async fn count_movements_for_account(&mut self, account_id: AccountId)
    -> Result<u64, StoreError>;

    /// Movements of an account with `from <= occurred_at <= to`, oldest first.
    async fn list_movements_for_account_in_range(
        &mut self,
        account_id: AccountId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Movement>, StoreError>;

    /// Lists movements, newest first.
    async fn list_movements(
        &mut self,
        query: &MovementQuery,
    ) -> Result<PageResponse<Movement>, StoreError>;

    // ========== Lifecycle ==========

    /// Publishes every write made in this transaction.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discards every write made in this transaction.
    async fn rollback(self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(StoreError::Conflict("serialization failure".into()).is_retryable());
        assert!(
            !StoreError::UniqueViolation {
                constraint: ACCOUNT_NUMBER_CONSTRAINT.into()
            }
            .is_retryable()
        );
        assert!(!StoreError::Integrity("orphan".into()).is_retryable());
        assert!(!StoreError::Backend("down".into()).is_retryable());
    }
}
