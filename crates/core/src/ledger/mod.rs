//! Movement posting: balance strategies, the debit guard and the engine.

mod engine;
mod error;
mod guard;
mod movement;
mod strategy;

#[cfg(test)]
mod engine_props;
#[cfg(test)]
mod guard_props;

pub use engine::LedgerEngine;
pub use error::LedgerError;
pub use guard::DebitGuard;
pub use movement::{Movement, MovementKind, NewMovement};
pub use strategy::{BalanceFn, BalanceStrategy};
