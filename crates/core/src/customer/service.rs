//! Customer registry.

use std::sync::Arc;

use accounts_shared::types::{CustomerId, PageResponse};
use tracing::{info, warn};

use super::types::{Customer, CustomerPatch, NewCustomer};
use crate::clock::Clock;
use crate::ledger::LedgerError;
use crate::store::{CustomerQuery, LedgerStore, StoreTx};

/// Registers, updates, deletes and lists customers.
pub struct CustomerService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: LedgerStore> CustomerService<S> {
    /// Creates a service over `store`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Registers a customer with a unique identification code.
    pub async fn register(&self, input: NewCustomer) -> Result<Customer, LedgerError> {
        let mut tx = self.store.begin().await?;
        ensure_identification_free(&mut tx, &input.identification).await?;

        let customer = Customer::register(input, self.clock.now());
        persist(tx, &customer).await?;

        info!(customer_id = %customer.id, "customer registered");
        Ok(customer)
    }

    /// Fetches a customer.
    pub async fn get(&self, id: CustomerId) -> Result<Customer, LedgerError> {
        let mut tx = self.store.begin().await?;
        load(&mut tx, id).await
    }

    /// Replaces every field of a customer.
    pub async fn update(&self, id: CustomerId, input: NewCustomer) -> Result<Customer, LedgerError> {
        let mut tx = self.store.begin().await?;
        let mut customer = load(&mut tx, id).await?;
        if customer.identification != input.identification {
            ensure_identification_free(&mut tx, &input.identification).await?;
        }

        customer.replace(input, self.clock.now());
        persist(tx, &customer).await?;
        Ok(customer)
    }

    /// Updates the fields present in `patch`.
    pub async fn patch(&self, id: CustomerId, patch: CustomerPatch) -> Result<Customer, LedgerError> {
        let mut tx = self.store.begin().await?;
        let mut customer = load(&mut tx, id).await?;
        if let Some(identification) = &patch.identification
            && *identification != customer.identification
        {
            ensure_identification_free(&mut tx, identification).await?;
        }

        customer.apply(patch, self.clock.now());
        persist(tx, &customer).await?;
        Ok(customer)
    }

    /// Deletes a customer that owns no accounts.
    pub async fn delete(&self, id: CustomerId) -> Result<(), LedgerError> {
        let mut tx = self.store.begin().await?;
        load(&mut tx, id).await?;

        let count = tx.count_accounts_for_customer(id).await?;
        if count > 0 {
            warn!(customer_id = %id, count, "customer deletion rejected: has accounts");
            return Err(LedgerError::HasDependents {
                resource: "customer",
                id: id.into_inner(),
                count,
            });
        }

        tx.delete_customer(id).await?;
        tx.commit().await?;
        info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    /// Lists customers, ordered by name.
    pub async fn list(&self, query: &CustomerQuery) -> Result<PageResponse<Customer>, LedgerError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.list_customers(query).await?)
    }
}

async fn load<T: StoreTx>(tx: &mut T, id: CustomerId) -> Result<Customer, LedgerError> {
    tx.load_customer(id)
        .await?
        .ok_or(LedgerError::CustomerNotFound(id.into_inner()))
}

async fn ensure_identification_free<T: StoreTx>(
    tx: &mut T,
    identification: &str,
) -> Result<(), LedgerError> {
    if tx
        .find_customer_by_identification(identification)
        .await?
        .is_some()
    {
        warn!(%identification, "duplicate customer identification");
        return Err(LedgerError::CustomerAlreadyExists(identification.to_string()));
    }
    Ok(())
}

/// Saves and commits, reporting a lost identification race as a duplicate.
async fn persist<T: StoreTx>(mut tx: T, customer: &Customer) -> Result<(), LedgerError> {
    let duplicate = |e| LedgerError::from_unique_violation(e, &customer.identification, "");
    tx.save_customer(customer).await.map_err(duplicate)?;
    tx.commit().await.map_err(duplicate)
}
