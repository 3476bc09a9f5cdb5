//! Account domain types.

use std::fmt;
use std::str::FromStr;

use accounts_shared::types::{AccountId, CustomerId};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Kind of customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountKind {
    /// Savings account.
    Savings,
    /// Checking account.
    Checking,
}

impl AccountKind {
    /// Stable string form used for persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "SAVINGS",
            Self::Checking => "CHECKING",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SAVINGS" => Ok(Self::Savings),
            "CHECKING" => Ok(Self::Checking),
            _ => Err(LedgerError::InvalidAccountKind(s.to_string())),
        }
    }
}

/// A customer account with its running balance.
///
/// `current_balance` always equals `initial_balance` plus credits minus
/// debits over the movements currently attached to the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Account number, unique and immutable once assigned.
    pub number: String,
    /// Account kind.
    pub kind: AccountKind,
    /// Balance the account was opened with.
    pub initial_balance: Decimal,
    /// Running balance.
    pub current_balance: Decimal,
    /// Whether the account accepts postings.
    pub is_active: bool,
    /// Opening timestamp.
    pub created_at: NaiveDateTime,
    /// Last modification timestamp.
    pub updated_at: NaiveDateTime,
}

/// Input for opening an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Account kind.
    pub kind: AccountKind,
    /// Opening balance.
    pub initial_balance: Decimal,
    /// Explicit current balance; defaults to `initial_balance`.
    #[serde(default)]
    pub current_balance: Option<Decimal>,
    /// Whether the account starts active.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update of an account. Number and owner are immutable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPatch {
    /// New account kind.
    pub kind: Option<AccountKind>,
    /// New status.
    pub is_active: Option<bool>,
}

impl Account {
    /// Builds an account from opening input and an allocated number.
    #[must_use]
    pub fn open(input: NewAccount, number: String, now: NaiveDateTime) -> Self {
        Self {
            id: AccountId::new(),
            customer_id: input.customer_id,
            number,
            kind: input.kind,
            initial_balance: input.initial_balance,
            current_balance: input.current_balance.unwrap_or(input.initial_balance),
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `patch`.
    pub fn apply(&mut self, patch: AccountPatch, now: NaiveDateTime) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    /// Case-insensitive match on the account number.
    #[must_use]
    pub fn matches(&self, search: &str) -> bool {
        self.number.to_lowercase().contains(&search.to_lowercase())
    }
}
