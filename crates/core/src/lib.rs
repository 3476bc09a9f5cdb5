//! Core ledger logic for the accounts service.
//!
//! This crate contains the business rules with ZERO web or database
//! dependencies. Persistence is reached through the [`store`] traits.
//!
//! # Modules
//!
//! - `customer` - Customer registry
//! - `account` - Account registry and account number allocation
//! - `ledger` - Balance strategies, debit guard and the posting engine
//! - `statement` - Per-customer statements and their renderers
//! - `store` - Transactional store traits and the in-memory store
//! - `clock` - Local wall-clock abstraction

pub mod account;
pub mod clock;
pub mod customer;
pub mod ledger;
pub mod statement;
pub mod store;

pub use account::{Account, AccountKind, AccountNumberAllocator, AccountService};
pub use clock::{Clock, FixedClock, SystemClock};
pub use customer::{Customer, CustomerService};
pub use ledger::{DebitGuard, LedgerEngine, LedgerError, Movement, MovementKind};
pub use statement::{Statement, StatementAggregator, StatementError};
pub use store::{InMemoryStore, LedgerStore, StoreError, StoreTx};
