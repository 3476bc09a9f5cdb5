//! In-process store used by tests, tools and single-node deployments.
//!
//! Committed state lives behind one `RwLock`. A transaction buffers its writes
//! as an operation log and replays them over the latest committed state on
//! reads, so it always observes its own writes. Account locks are per-account
//! async mutexes held until the transaction ends; a committed account deletion
//! drops its mutex from the registry once no one else waits on it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use accounts_shared::types::{AccountId, CustomerId, MovementId, PageRequest, PageResponse};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    ACCOUNT_NUMBER_CONSTRAINT, AccountQuery, CUSTOMER_IDENTIFICATION_CONSTRAINT, CustomerQuery,
    LedgerStore, MovementQuery, StoreError, StoreTx,
};
use crate::account::Account;
use crate::customer::Customer;
use crate::ledger::{Movement, MovementKind};

#[derive(Debug, Clone, Default)]
struct State {
    customers: HashMap<CustomerId, Customer>,
    accounts: HashMap<AccountId, Account>,
    movements: HashMap<MovementId, Movement>,
}

#[derive(Debug, Clone)]
enum Op {
    PutCustomer(Customer),
    DeleteCustomer(CustomerId),
    PutAccount(Account),
    DeleteAccount(AccountId),
    PutMovement(Movement),
    DeleteMovement(MovementId),
}

impl State {
    fn apply(&mut self, op: &Op) {
        match op {
            Op::PutCustomer(c) => {
                self.customers.insert(c.id, c.clone());
            }
            Op::DeleteCustomer(id) => {
                self.customers.remove(id);
            }
            Op::PutAccount(a) => {
                self.accounts.insert(a.id, a.clone());
            }
            Op::DeleteAccount(id) => {
                self.accounts.remove(id);
            }
            Op::PutMovement(m) => {
                self.movements.insert(m.id, m.clone());
            }
            Op::DeleteMovement(id) => {
                self.movements.remove(id);
            }
        }
    }

    /// Enforces the same constraints the relational schema declares.
    fn check_constraints(&self) -> Result<(), StoreError> {
        let mut identifications = HashMap::with_capacity(self.customers.len());
        for customer in self.customers.values() {
            if identifications
                .insert(customer.identification.as_str(), customer.id)
                .is_some()
            {
                return Err(StoreError::UniqueViolation {
                    constraint: CUSTOMER_IDENTIFICATION_CONSTRAINT.to_string(),
                });
            }
        }

        let mut numbers = HashMap::with_capacity(self.accounts.len());
        for account in self.accounts.values() {
            if numbers.insert(account.number.as_str(), account.id).is_some() {
                return Err(StoreError::UniqueViolation {
                    constraint: ACCOUNT_NUMBER_CONSTRAINT.to_string(),
                });
            }
            if !self.customers.contains_key(&account.customer_id) {
                return Err(StoreError::Integrity(format!(
                    "account {} references missing customer {}",
                    account.id, account.customer_id
                )));
            }
        }

        for movement in self.movements.values() {
            if !self.accounts.contains_key(&movement.account_id) {
                return Err(StoreError::Integrity(format!(
                    "movement {} references missing account {}",
                    movement.id, movement.account_id
                )));
            }
        }

        Ok(())
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("in-memory state lock poisoned".to_string())
}

/// Thread-safe in-memory [`LedgerStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
    locks: Arc<DashMap<AccountId, Arc<Mutex<()>>>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(InMemoryTx {
            state: Arc::clone(&self.state),
            locks: Arc::clone(&self.locks),
            held: HashMap::new(),
            ops: Vec::new(),
        })
    }
}

/// Transaction over an [`InMemoryStore`].
#[derive(Debug)]
pub struct InMemoryTx {
    state: Arc<RwLock<State>>,
    locks: Arc<DashMap<AccountId, Arc<Mutex<()>>>>,
    held: HashMap<AccountId, OwnedMutexGuard<()>>,
    ops: Vec<Op>,
}

impl InMemoryTx {
    /// Runs `f` over the latest committed state with this transaction's
    /// writes replayed on top. A transaction without writes reads the
    /// committed state in place.
    fn read<R>(&self, f: impl FnOnce(&State) -> R) -> Result<R, StoreError> {
        let committed = self.state.read().map_err(poisoned)?;
        if self.ops.is_empty() {
            return Ok(f(&committed));
        }

        let mut view = committed.clone();
        drop(committed);
        for op in &self.ops {
            view.apply(op);
        }
        Ok(f(&view))
    }
}

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> PageResponse<T> {
    PageResponse::for_request(page.slice(items), page, items.len() as u64)
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn load_customer(&mut self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        self.read(|s| s.customers.get(&id).cloned())
    }

    async fn find_customer_by_identification(
        &mut self,
        identification: &str,
    ) -> Result<Option<Customer>, StoreError> {
        self.read(|s| {
            s.customers
                .values()
                .find(|c| c.identification == identification)
                .cloned()
        })
    }

    async fn save_customer(&mut self, customer: &Customer) -> Result<(), StoreError> {
        self.ops.push(Op::PutCustomer(customer.clone()));
        Ok(())
    }

    async fn delete_customer(&mut self, id: CustomerId) -> Result<(), StoreError> {
        self.ops.push(Op::DeleteCustomer(id));
        Ok(())
    }

    async fn list_customers(
        &mut self,
        query: &CustomerQuery,
    ) -> Result<PageResponse<Customer>, StoreError> {
        let mut customers: Vec<Customer> = self.read(|s| {
            s.customers
                .values()
                .filter(|c| query.search.as_deref().is_none_or(|q| c.matches(q)))
                .cloned()
                .collect()
        })?;
        customers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page_of(&customers, query.page))
    }

    async fn load_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError> {
        self.read(|s| s.accounts.get(&id).cloned())
    }

    async fn lock_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError> {
        if !self.held.contains_key(&id) {
            // Clone the mutex out so the map shard is not held across the await.
            let mutex = Arc::clone(self.locks.entry(id).or_default().value());
            let guard = mutex.lock_owned().await;
            self.held.insert(id, guard);
        }
        self.load_account(id).await
    }

    async fn save_account(&mut self, account: &Account) -> Result<(), StoreError> {
        self.ops.push(Op::PutAccount(account.clone()));
        Ok(())
    }

    async fn delete_account(&mut self, id: AccountId) -> Result<(), StoreError> {
        self.ops.push(Op::DeleteAccount(id));
        Ok(())
    }

    async fn account_exists_by_number(&mut self, number: &str) -> Result<bool, StoreError> {
        self.read(|s| s.accounts.values().any(|a| a.number == number))
    }

    async fn list_account_numbers(&mut self) -> Result<Vec<String>, StoreError> {
        self.read(|s| s.accounts.values().map(|a| a.number.clone()).collect())
    }

    async fn list_accounts_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self.read(|s| {
            s.accounts
                .values()
                .filter(|a| a.customer_id == customer_id)
                .cloned()
                .collect()
        })?;
        accounts.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(accounts)
    }

    async fn count_accounts_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<u64, StoreError> {
        self.read(|s| {
            s.accounts
                .values()
                .filter(|a| a.customer_id == customer_id)
                .count() as u64
        })
    }

    async fn list_accounts(
        &mut self,
        query: &AccountQuery,
    ) -> Result<PageResponse<Account>, StoreError> {
        let mut accounts: Vec<Account> = self.read(|s| {
            s.accounts
                .values()
                .filter(|a| query.customer_id.is_none_or(|id| a.customer_id == id))
                .filter(|a| query.search.as_deref().is_none_or(|q| a.matches(q)))
                .cloned()
                .collect()
        })?;
        accounts.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(page_of(&accounts, query.page))
    }

    async fn load_movement(&mut self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        self.read(|s| s.movements.get(&id).cloned())
    }

    async fn save_movement(&mut self, movement: &Movement) -> Result<(), StoreError> {
        self.ops.push(Op::PutMovement(movement.clone()));
        Ok(())
    }

    async fn delete_movement(&mut self, id: MovementId) -> Result<(), StoreError> {
        self.ops.push(Op::DeleteMovement(id));
        Ok(())
    }

    async fn sum_debits_for_account_on_date(
        &mut self,
        account_id: AccountId,
        date: NaiveDate,
    ) -> Result<Decimal, StoreError> {
        self.read(|s| {
            s.movements
                .values()
                .filter(|m| {
                    m.account_id == account_id
                        && m.kind == MovementKind::Debit
                        && m.occurred_at.date() == date
                })
                .map(|m| m.amount)
                .sum::<Decimal>()
        })
    }

    async fn count_movements_for_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<u64, StoreError> {
        self.read(|s| {
            s.movements
                .values()
                .filter(|m| m.account_id == account_id)
                .count() as u64
        })
    }

    async fn list_movements_for_account_in_range(
        &mut self,
        account_id: AccountId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Movement>, StoreError> {
        let mut movements: Vec<Movement> = self.read(|s| {
            s.movements
                .values()
                .filter(|m| {
                    m.account_id == account_id && m.occurred_at >= from && m.occurred_at <= to
                })
                .cloned()
                .collect()
        })?;
        movements.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then(a.id.cmp(&b.id)));
        Ok(movements)
    }

    async fn list_movements(
        &mut self,
        query: &MovementQuery,
    ) -> Result<PageResponse<Movement>, StoreError> {
        let mut movements: Vec<Movement> = self.read(|s| {
            s.movements
                .values()
                .filter(|m| query.account_id.is_none_or(|id| m.account_id == id))
                .filter(|m| query.from.is_none_or(|from| m.occurred_at >= from))
                .filter(|m| query.to.is_none_or(|to| m.occurred_at <= to))
                .cloned()
                .collect()
        })?;
        movements.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then(b.id.cmp(&a.id)));
        Ok(page_of(&movements, query.page))
    }

    async fn commit(self) -> Result<(), StoreError> {
        let Self {
            state,
            locks,
            held,
            ops,
        } = self;

        {
            let mut committed = state.write().map_err(poisoned)?;
            let mut next = committed.clone();
            for op in &ops {
                next.apply(op);
            }
            next.check_constraints()?;
            *committed = next;
        }

        // Release before pruning so an idle mutex is only referenced by the map.
        drop(held);
        for op in &ops {
            if let Op::DeleteAccount(id) = op {
                locks.remove_if(id, |_, mutex| Arc::strong_count(mutex) == 1);
            }
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
