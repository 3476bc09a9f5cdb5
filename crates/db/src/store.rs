//! PostgreSQL implementation of the ledger store.
//!
//! Each [`PgTx`] wraps one database transaction. Account locks are row-level
//! `SELECT ... FOR UPDATE` locks released when the transaction ends; dropping
//! an uncommitted [`PgTx`] rolls it back.

use accounts_core::account::Account;
use accounts_core::customer::Customer;
use accounts_core::ledger::{Movement, MovementKind};
use accounts_core::store::{
    AccountQuery, CustomerQuery, LedgerStore, MovementQuery, StoreError, StoreTx,
};
use accounts_shared::types::{AccountId, CustomerId, MovementId, PageRequest, PageResponse};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};

use crate::convert::{
    account_from_model, account_to_active, customer_from_model, customer_to_active,
    movement_from_model, movement_to_active, store_err,
};
use crate::entities::{accounts, customers, movements};

/// [`LedgerStore`] backed by PostgreSQL through `SeaORM`.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    db: DatabaseConnection,
}

impl PgLedgerStore {
    /// Creates a store over an open connection pool.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Underlying connection pool.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let txn = self.db.begin().await.map_err(store_err)?;
        Ok(PgTx { txn })
    }
}

/// Transaction over a [`PgLedgerStore`].
pub struct PgTx {
    txn: DatabaseTransaction,
}

/// `lower(column) LIKE %search%`.
fn ilike<C: ColumnTrait + 'static>(column: C, search: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", search.to_lowercase()))
}

impl PgTx {
    async fn page<E, T>(
        &self,
        select: Select<E>,
        request: PageRequest,
        convert: fn(E::Model) -> Result<T, StoreError>,
    ) -> Result<PageResponse<T>, StoreError>
    where
        E: EntityTrait,
        E::Model: Send + Sync,
    {
        let total = select.clone().count(&self.txn).await.map_err(store_err)?;
        let rows = select
            .offset(request.offset())
            .limit(request.limit())
            .all(&self.txn)
            .await
            .map_err(store_err)?;
        let data = rows.into_iter().map(convert).collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::for_request(data, request, total))
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn load_customer(&mut self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        customers::Entity::find_by_id(id.into_inner())
            .one(&self.txn)
            .await
            .map_err(store_err)?
            .map(customer_from_model)
            .transpose()
    }

    async fn find_customer_by_identification(
        &mut self,
        identification: &str,
    ) -> Result<Option<Customer>, StoreError> {
        customers::Entity::find()
            .filter(customers::Column::Identification.eq(identification))
            .one(&self.txn)
            .await
            .map_err(store_err)?
            .map(customer_from_model)
            .transpose()
    }

    async fn save_customer(&mut self, customer: &Customer) -> Result<(), StoreError> {
        customers::Entity::insert(customer_to_active(customer))
            .on_conflict(
                OnConflict::column(customers::Column::Id)
                    .update_columns([
                        customers::Column::Name,
                        customers::Column::Gender,
                        customers::Column::Age,
                        customers::Column::Identification,
                        customers::Column::Address,
                        customers::Column::Phone,
                        customers::Column::IsActive,
                        customers::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn delete_customer(&mut self, id: CustomerId) -> Result<(), StoreError> {
        customers::Entity::delete_by_id(id.into_inner())
            .exec(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn list_customers(
        &mut self,
        query: &CustomerQuery,
    ) -> Result<PageResponse<Customer>, StoreError> {
        let mut select = customers::Entity::find()
            .order_by_asc(customers::Column::Name)
            .order_by_asc(customers::Column::Id);
        if let Some(search) = &query.search {
            select = select.filter(
                Condition::any()
                    .add(ilike(customers::Column::Name, search))
                    .add(ilike(customers::Column::Identification, search)),
            );
        }
        self.page(select, query.page, customer_from_model).await
    }

    async fn load_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.txn)
            .await
            .map_err(store_err)?
            .map(account_from_model)
            .transpose()
    }

    async fn lock_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError> {
        accounts::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(store_err)?
            .map(account_from_model)
            .transpose()
    }

    async fn save_account(&mut self, account: &Account) -> Result<(), StoreError> {
        accounts::Entity::insert(account_to_active(account))
            .on_conflict(
                OnConflict::column(accounts::Column::Id)
                    .update_columns([
                        accounts::Column::Kind,
                        accounts::Column::CurrentBalance,
                        accounts::Column::IsActive,
                        accounts::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn delete_account(&mut self, id: AccountId) -> Result<(), StoreError> {
        accounts::Entity::delete_by_id(id.into_inner())
            .exec(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn account_exists_by_number(&mut self, number: &str) -> Result<bool, StoreError> {
        let count = accounts::Entity::find()
            .filter(accounts::Column::Number.eq(number))
            .count(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(count > 0)
    }

    async fn list_account_numbers(&mut self) -> Result<Vec<String>, StoreError> {
        accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Number)
            .into_tuple()
            .all(&self.txn)
            .await
            .map_err(store_err)
    }

    async fn list_accounts_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Vec<Account>, StoreError> {
        accounts::Entity::find()
            .filter(accounts::Column::CustomerId.eq(customer_id.into_inner()))
            .order_by_asc(accounts::Column::Number)
            .all(&self.txn)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(account_from_model)
            .collect()
    }

    async fn count_accounts_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<u64, StoreError> {
        accounts::Entity::find()
            .filter(accounts::Column::CustomerId.eq(customer_id.into_inner()))
            .count(&self.txn)
            .await
            .map_err(store_err)
    }

    async fn list_accounts(
        &mut self,
        query: &AccountQuery,
    ) -> Result<PageResponse<Account>, StoreError> {
        let mut select = accounts::Entity::find().order_by_asc(accounts::Column::Number);
        if let Some(customer_id) = query.customer_id {
            select = select.filter(accounts::Column::CustomerId.eq(customer_id.into_inner()));
        }
        if let Some(search) = &query.search {
            select = select.filter(ilike(accounts::Column::Number, search));
        }
        self.page(select, query.page, account_from_model).await
    }

    async fn load_movement(&mut self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        movements::Entity::find_by_id(id.into_inner())
            .one(&self.txn)
            .await
            .map_err(store_err)?
            .map(movement_from_model)
            .transpose()
    }

    async fn save_movement(&mut self, movement: &Movement) -> Result<(), StoreError> {
        movements::Entity::insert(movement_to_active(movement))
            .exec(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn delete_movement(&mut self, id: MovementId) -> Result<(), StoreError> {
        movements::Entity::delete_by_id(id.into_inner())
            .exec(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn sum_debits_for_account_on_date(
        &mut self,
        account_id: AccountId,
        date: NaiveDate,
    ) -> Result<Decimal, StoreError> {
        // Whole calendar day, `[date 00:00, next day 00:00)`.
        let mut select = movements::Entity::find()
            .filter(movements::Column::AccountId.eq(account_id.into_inner()))
            .filter(movements::Column::Kind.eq(MovementKind::Debit.as_str()))
            .filter(movements::Column::OccurredAt.gte(date.and_time(NaiveTime::MIN)));
        if let Some(next) = date.succ_opt() {
            select = select.filter(movements::Column::OccurredAt.lt(next.and_time(NaiveTime::MIN)));
        }
        let total: Option<Option<Decimal>> = select
            .select_only()
            .column_as(Expr::col(movements::Column::Amount).sum(), "total")
            .into_tuple()
            .one(&self.txn)
            .await
            .map_err(store_err)?;
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    async fn count_movements_for_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<u64, StoreError> {
        movements::Entity::find()
            .filter(movements::Column::AccountId.eq(account_id.into_inner()))
            .count(&self.txn)
            .await
            .map_err(store_err)
    }

    async fn list_movements_for_account_in_range(
        &mut self,
        account_id: AccountId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Movement>, StoreError> {
        movements::Entity::find()
            .filter(movements::Column::AccountId.eq(account_id.into_inner()))
            .filter(movements::Column::OccurredAt.between(from, to))
            .order_by_asc(movements::Column::OccurredAt)
            .order_by_asc(movements::Column::Id)
            .all(&self.txn)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(movement_from_model)
            .collect()
    }

    async fn list_movements(
        &mut self,
        query: &MovementQuery,
    ) -> Result<PageResponse<Movement>, StoreError> {
        let mut select = movements::Entity::find()
            .order_by_desc(movements::Column::OccurredAt)
            .order_by_desc(movements::Column::Id);
        if let Some(account_id) = query.account_id {
            select = select.filter(movements::Column::AccountId.eq(account_id.into_inner()));
        }
        if let Some(from) = query.from {
            select = select.filter(movements::Column::OccurredAt.gte(from));
        }
        if let Some(to) = query.to {
            select = select.filter(movements::Column::OccurredAt.lte(to));
        }
        self.page(select, query.page, movement_from_model).await
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(store_err)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.txn.rollback().await.map_err(store_err)
    }
}
