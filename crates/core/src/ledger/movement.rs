//! Movement records and their kinds.

use std::fmt;
use std::str::FromStr;

use accounts_shared::types::{AccountId, MovementId};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Direction of a movement. The discriminant indexes the strategy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    /// Money into the account.
    Credit = 0,
    /// Money out of the account.
    Debit = 1,
}

impl MovementKind {
    /// Stable string form used for persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CREDIT" => Ok(Self::Credit),
            "DEBIT" => Ok(Self::Debit),
            _ => Err(LedgerError::InvalidMovementKind(s.to_string())),
        }
    }
}

/// A posted movement. `balance` is the account balance right after posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Unique identifier.
    pub id: MovementId,
    /// Owning account, fixed at creation.
    pub account_id: AccountId,
    /// Local posting time.
    pub occurred_at: NaiveDateTime,
    /// Free-form description.
    pub description: String,
    /// Credit or debit.
    pub kind: MovementKind,
    /// Unsigned amount; the sign comes from `kind`.
    pub amount: Decimal,
    /// Balance snapshot after posting.
    pub balance: Decimal,
}

/// Posting request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovement {
    /// Target account.
    pub account_id: AccountId,
    /// Credit or debit.
    pub kind: MovementKind,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}
