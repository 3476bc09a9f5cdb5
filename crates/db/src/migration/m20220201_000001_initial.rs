//! Initial schema: customers, accounts and movements.
//!
//! Constraint names are part of the contract with the store, which maps
//! unique violations back to domain errors by name.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SCHEMA_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS movements; DROP TABLE IF EXISTS accounts; DROP TABLE IF EXISTS customers;",
        )
        .await?;
        Ok(())
    }
}

const SCHEMA_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    gender VARCHAR(32) NOT NULL,
    age INTEGER NOT NULL CHECK (age >= 0),
    identification VARCHAR(64) NOT NULL,
    address VARCHAR(255) NOT NULL,
    phone VARCHAR(32) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL,
    CONSTRAINT customers_identification_key UNIQUE (identification)
);

CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    customer_id UUID NOT NULL REFERENCES customers(id) ON DELETE RESTRICT,
    number VARCHAR(32) NOT NULL,
    kind VARCHAR(16) NOT NULL CHECK (kind IN ('SAVINGS', 'CHECKING')),
    initial_balance NUMERIC(19, 4) NOT NULL,
    current_balance NUMERIC(19, 4) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL,
    CONSTRAINT accounts_number_key UNIQUE (number)
);

-- Statements list a customer's accounts
CREATE INDEX idx_accounts_customer ON accounts(customer_id, number);

CREATE TABLE movements (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    occurred_at TIMESTAMP NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    kind VARCHAR(8) NOT NULL CHECK (kind IN ('CREDIT', 'DEBIT')),
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    balance NUMERIC(19, 4) NOT NULL
);

-- Daily debit sums and statement ranges scan by account and time
CREATE INDEX idx_movements_account_time ON movements(account_id, occurred_at);
";
