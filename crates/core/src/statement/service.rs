//! Statement aggregation.

use std::sync::Arc;

use accounts_shared::types::CustomerId;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::debug;

use super::error::StatementError;
use super::types::{AccountStatement, DateRange, Statement, StatementCustomer};
use crate::store::{LedgerStore, StoreTx};

const LAST_SECOND_OF_DAY: i64 = 86_399;

/// Statement window for a calendar range: `from 00:00:00` through `to 23:59:59`.
///
/// The window stops at the last whole second of `to`, so a movement stamped
/// `23:59:59.5` on that day is outside it.
#[must_use]
pub fn day_bounds(from: NaiveDate, to: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = from.and_time(NaiveTime::MIN);
    let end = to
        .and_time(NaiveTime::MIN)
        .checked_add_signed(TimeDelta::seconds(LAST_SECOND_OF_DAY))
        .unwrap_or(NaiveDateTime::MAX);
    (start, end)
}

/// Builds per-account statements for a customer. Read-only.
pub struct StatementAggregator<S> {
    store: Arc<S>,
}

impl<S: LedgerStore> StatementAggregator<S> {
    /// Creates an aggregator over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Collects every account of `customer_id` with its movements in `[from, to]`.
    ///
    /// Accounts without movements in range still get an entry with zero totals.
    pub async fn build_statement(
        &self,
        customer_id: CustomerId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Statement, StatementError> {
        if from > to {
            return Err(StatementError::InvalidRange { from, to });
        }

        let mut tx = self.store.begin().await?;
        let customer = tx
            .load_customer(customer_id)
            .await?
            .ok_or(StatementError::CustomerNotFound(customer_id.into_inner()))?;

        let (start, end) = day_bounds(from, to);
        let accounts = tx.list_accounts_for_customer(customer_id).await?;
        let mut entries = Vec::with_capacity(accounts.len());
        for account in &accounts {
            let movements = tx
                .list_movements_for_account_in_range(account.id, start, end)
                .await?;
            entries.push(AccountStatement::from_movements(account, movements));
        }
        tx.rollback().await?;

        debug!(
            customer_id = %customer_id,
            %from,
            %to,
            accounts = entries.len(),
            "statement built"
        );
        Ok(Statement {
            customer: StatementCustomer::from(&customer),
            range: DateRange { from, to },
            accounts: entries,
        })
    }
}
