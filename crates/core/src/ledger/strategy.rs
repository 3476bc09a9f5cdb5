//! Balance mutation per movement kind.
//!
//! Each kind maps to a pure `(balance, amount) -> balance` function held in a
//! table indexed by the kind's discriminant. Reversal feeds the negated amount
//! through the same function, so a reversed debit re-credits and a reversed
//! credit re-debits.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::movement::MovementKind;

/// Pure balance mutation.
pub type BalanceFn = fn(Decimal, Decimal) -> Decimal;

fn credit(balance: Decimal, amount: Decimal) -> Decimal {
    balance + amount
}

fn debit(balance: Decimal, amount: Decimal) -> Decimal {
    balance - amount
}

const STRATEGIES: [BalanceFn; 2] = [credit, debit];

/// Balance strategy bound to one movement kind.
#[derive(Debug, Clone, Copy)]
pub struct BalanceStrategy {
    kind: MovementKind,
    apply: BalanceFn,
}

impl BalanceStrategy {
    /// Strategy for `kind`.
    #[must_use]
    pub const fn for_kind(kind: MovementKind) -> Self {
        Self {
            kind,
            apply: STRATEGIES[kind as usize],
        }
    }

    /// Strategy for a kind given by name, e.g. `"DEBIT"`.
    pub fn for_name(name: &str) -> Result<Self, LedgerError> {
        name.parse().map(Self::for_kind)
    }

    /// Kind this strategy handles.
    #[must_use]
    pub const fn kind(&self) -> MovementKind {
        self.kind
    }

    /// Balance after posting `amount`.
    #[must_use]
    pub fn apply(&self, balance: Decimal, amount: Decimal) -> Decimal {
        (self.apply)(balance, amount)
    }

    /// Balance after undoing a posting of `amount`.
    #[must_use]
    pub fn reverse(&self, balance: Decimal, amount: Decimal) -> Decimal {
        (self.apply)(balance, -amount)
    }
}
