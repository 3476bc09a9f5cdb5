//! Posting and reversal of movements.
//!
//! A posting moves through `Received -> Validated -> BalanceComputed ->
//! Persisted`, or stops at `Rejected` at any validation step. Every step runs
//! inside one store transaction that holds the account lock, so postings on
//! the same account serialize and a rejected posting leaves no trace.

use std::sync::Arc;

use accounts_shared::types::{MovementId, PageResponse};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::error::LedgerError;
use super::guard::DebitGuard;
use super::movement::{Movement, MovementKind, NewMovement};
use super::strategy::BalanceStrategy;
use crate::clock::Clock;
use crate::store::{LedgerStore, MovementQuery, StoreTx};

/// Orchestrates movement postings against a [`LedgerStore`].
pub struct LedgerEngine<S> {
    store: Arc<S>,
    guard: DebitGuard,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for LedgerEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            guard: self.guard,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: LedgerStore> LedgerEngine<S> {
    /// Creates an engine over `store`.
    pub fn new(store: Arc<S>, guard: DebitGuard, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            guard,
            clock,
        }
    }

    /// Posts a movement and updates the account balance atomically.
    pub async fn create(&self, input: NewMovement) -> Result<Movement, LedgerError> {
        validate_amount(input.amount)?;

        let mut tx = self.store.begin().await?;
        let mut account = tx
            .lock_account(input.account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(input.account_id.into_inner()))?;

        if !account.is_active {
            warn!(account_id = %account.id, "posting rejected: account inactive");
            return Err(LedgerError::AccountInactive(account.id.into_inner()));
        }

        let now = self.clock.now();
        if input.kind == MovementKind::Debit {
            self.guard
                .authorize(&mut tx, &account, input.amount, now.date())
                .await?;
        }

        let strategy = BalanceStrategy::for_kind(input.kind);
        let balance = strategy.apply(account.current_balance, input.amount);

        let movement = Movement {
            id: MovementId::new(),
            account_id: account.id,
            occurred_at: now,
            description: input.description,
            kind: input.kind,
            amount: input.amount,
            balance,
        };
        account.current_balance = balance;
        account.updated_at = now;

        tx.save_movement(&movement).await?;
        tx.save_account(&account).await?;
        tx.commit().await?;

        info!(
            movement_id = %movement.id,
            account_id = %account.id,
            kind = %movement.kind,
            amount = %movement.amount,
            %balance,
            "movement posted"
        );
        Ok(movement)
    }

    /// Removes a movement and undoes its effect on the account balance.
    ///
    /// The debit guard does not run: a reversal corrects history rather than
    /// withdrawing money.
    pub async fn reverse(&self, movement_id: MovementId) -> Result<Movement, LedgerError> {
        let not_found = || LedgerError::MovementNotFound(movement_id.into_inner());

        let mut tx = self.store.begin().await?;
        let account_id = tx
            .load_movement(movement_id)
            .await?
            .ok_or_else(not_found)?
            .account_id;

        let mut account = tx
            .lock_account(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id.into_inner()))?;
        // Another reversal may have won the lock first.
        let movement = tx.load_movement(movement_id).await?.ok_or_else(not_found)?;

        let strategy = BalanceStrategy::for_kind(movement.kind);
        account.current_balance = strategy.reverse(account.current_balance, movement.amount);
        account.updated_at = self.clock.now();

        tx.save_account(&account).await?;
        tx.delete_movement(movement.id).await?;
        tx.commit().await?;

        info!(
            movement_id = %movement.id,
            account_id = %account.id,
            kind = %movement.kind,
            amount = %movement.amount,
            balance = %account.current_balance,
            "movement reversed"
        );
        Ok(movement)
    }

    /// Deletes a movement by reversing it.
    pub async fn delete(&self, movement_id: MovementId) -> Result<(), LedgerError> {
        self.reverse(movement_id).await.map(|_| ())
    }

    /// Fetches a movement.
    pub async fn get(&self, movement_id: MovementId) -> Result<Movement, LedgerError> {
        let mut tx = self.store.begin().await?;
        tx.load_movement(movement_id)
            .await?
            .ok_or(LedgerError::MovementNotFound(movement_id.into_inner()))
    }

    /// Lists movements, newest first.
    pub async fn list(&self, query: &MovementQuery) -> Result<PageResponse<Movement>, LedgerError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.list_movements(query).await?)
    }
}

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if amount.is_sign_negative() {
        return Err(LedgerError::NegativeAmount);
    }
    Ok(())
}
