//! Statement value objects.

use accounts_shared::types::{AccountId, CustomerId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::{Account, AccountKind};
use crate::customer::Customer;
use crate::ledger::{Movement, MovementKind};

/// Customer header of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementCustomer {
    /// Customer ID.
    pub id: CustomerId,
    /// Full name.
    pub name: String,
    /// Identification code.
    pub identification: String,
}

impl From<&Customer> for StatementCustomer {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            identification: customer.identification.clone(),
        }
    }
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day.
    pub from: NaiveDate,
    /// Last day.
    pub to: NaiveDate,
}

/// Totals over the movements inside the range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementTotals {
    /// Sum of debit amounts.
    pub debits: Decimal,
    /// Sum of credit amounts.
    pub credits: Decimal,
}

/// One account's activity inside the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatement {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub number: String,
    /// Account kind.
    pub kind: AccountKind,
    /// Opening balance of the account.
    pub initial_balance: Decimal,
    /// Balance at the time the statement was built.
    pub current_balance: Decimal,
    /// Whether the account is active.
    pub is_active: bool,
    /// Movements in range, oldest first.
    pub movements: Vec<Movement>,
    /// Windowed totals.
    pub totals: StatementTotals,
}

impl AccountStatement {
    /// Folds in-range movements into an account entry.
    #[must_use]
    pub fn from_movements(account: &Account, movements: Vec<Movement>) -> Self {
        let totals = movements
            .iter()
            .fold(StatementTotals::default(), |mut totals, m| {
                match m.kind {
                    MovementKind::Debit => totals.debits += m.amount,
                    MovementKind::Credit => totals.credits += m.amount,
                }
                totals
            });

        Self {
            account_id: account.id,
            number: account.number.clone(),
            kind: account.kind,
            initial_balance: account.initial_balance,
            current_balance: account.current_balance,
            is_active: account.is_active,
            movements,
            totals,
        }
    }
}

/// A customer's statement over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Customer header.
    pub customer: StatementCustomer,
    /// Covered range.
    pub range: DateRange,
    /// One entry per account, ordered by number.
    pub accounts: Vec<AccountStatement>,
}
