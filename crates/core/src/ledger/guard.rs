//! Debit authorization.
//!
//! Checks run in a fixed order and the first failure wins:
//! 1. the balance must be positive,
//! 2. the balance must cover the amount,
//! 3. same-day debits plus the amount must not exceed the daily limit.
//!
//! Equality passes on both metrics.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use super::error::LedgerError;
use crate::account::Account;
use crate::store::StoreTx;

/// Enforces balance sufficiency and the daily withdrawal limit.
#[derive(Debug, Clone, Copy)]
pub struct DebitGuard {
    daily_limit: Decimal,
}

impl DebitGuard {
    /// Creates a guard with the deployment's daily withdrawal limit.
    #[must_use]
    pub const fn new(daily_limit: Decimal) -> Self {
        Self { daily_limit }
    }

    /// Configured daily withdrawal limit.
    #[must_use]
    pub const fn daily_limit(&self) -> Decimal {
        self.daily_limit
    }

    /// Pure form of the checks, given what was already debited today.
    pub fn check(
        &self,
        account: &Account,
        amount: Decimal,
        debited_today: Decimal,
    ) -> Result<(), LedgerError> {
        let balance = account.current_balance;
        if balance <= Decimal::ZERO || balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account_id: account.id.into_inner(),
                balance,
                requested: amount,
            });
        }

        if debited_today + amount > self.daily_limit {
            return Err(LedgerError::DailyLimitExceeded {
                account_id: account.id.into_inner(),
                limit: self.daily_limit,
                debited_today,
                requested: amount,
            });
        }

        Ok(())
    }

    /// Authorizes a debit of `amount` on `account` for the local calendar day `today`.
    pub async fn authorize<T: StoreTx>(
        &self,
        tx: &mut T,
        account: &Account,
        amount: Decimal,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        let debited_today = tx.sum_debits_for_account_on_date(account.id, today).await?;
        self.check(account, amount, debited_today).inspect_err(|err| {
            warn!(
                account_id = %account.id,
                %amount,
                %debited_today,
                code = err.error_code(),
                "debit rejected"
            );
        })
    }
}
