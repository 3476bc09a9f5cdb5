//! Customer accounts and account number allocation.

mod allocator;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use allocator::{AccountNumberAllocator, NumberGenerator, NumericGenerator, RandomGenerator};
pub use service::AccountService;
pub use types::{Account, AccountKind, AccountPatch, NewAccount};
