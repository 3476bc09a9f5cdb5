//! Conversions between `SeaORM` models and domain types.

use accounts_core::account::{Account, AccountKind};
use accounts_core::customer::Customer;
use accounts_core::ledger::{Movement, MovementKind};
use accounts_core::store::StoreError;
use sea_orm::ActiveValue::Set;
use sea_orm::{DbErr, SqlErr};

use crate::entities::{accounts, customers, movements};

pub(crate) fn customer_from_model(model: customers::Model) -> Result<Customer, StoreError> {
    let age = u16::try_from(model.age)
        .map_err(|_| StoreError::Integrity(format!("customer {} has age {}", model.id, model.age)))?;
    Ok(Customer {
        id: model.id.into(),
        name: model.name,
        gender: model.gender,
        age,
        identification: model.identification,
        address: model.address,
        phone: model.phone,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub(crate) fn customer_to_active(customer: &Customer) -> customers::ActiveModel {
    customers::ActiveModel {
        id: Set(customer.id.into_inner()),
        name: Set(customer.name.clone()),
        gender: Set(customer.gender.clone()),
        age: Set(i32::from(customer.age)),
        identification: Set(customer.identification.clone()),
        address: Set(customer.address.clone()),
        phone: Set(customer.phone.clone()),
        is_active: Set(customer.is_active),
        created_at: Set(customer.created_at),
        updated_at: Set(customer.updated_at),
    }
}

pub(crate) fn account_from_model(model: accounts::Model) -> Result<Account, StoreError> {
    let kind: AccountKind = model
        .kind
        .parse()
        .map_err(|_| StoreError::Integrity(format!("account {} has kind {}", model.id, model.kind)))?;
    Ok(Account {
        id: model.id.into(),
        customer_id: model.customer_id.into(),
        number: model.number,
        kind,
        initial_balance: model.initial_balance,
        current_balance: model.current_balance,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub(crate) fn account_to_active(account: &Account) -> accounts::ActiveModel {
    accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        customer_id: Set(account.customer_id.into_inner()),
        number: Set(account.number.clone()),
        kind: Set(account.kind.as_str().to_string()),
        initial_balance: Set(account.initial_balance),
        current_balance: Set(account.current_balance),
        is_active: Set(account.is_active),
        created_at: Set(account.created_at),
        updated_at: Set(account.updated_at),
    }
}

pub(crate) fn movement_from_model(model: movements::Model) -> Result<Movement, StoreError> {
    let kind: MovementKind = model
        .kind
        .parse()
        .map_err(|_| StoreError::Integrity(format!("movement {} has kind {}", model.id, model.kind)))?;
    Ok(Movement {
        id: model.id.into(),
        account_id: model.account_id.into(),
        occurred_at: model.occurred_at,
        description: model.description,
        kind,
        amount: model.amount,
        balance: model.balance,
    })
}

pub(crate) fn movement_to_active(movement: &Movement) -> movements::ActiveModel {
    movements::ActiveModel {
        id: Set(movement.id.into_inner()),
        account_id: Set(movement.account_id.into_inner()),
        occurred_at: Set(movement.occurred_at),
        description: Set(movement.description.clone()),
        kind: Set(movement.kind.as_str().to_string()),
        amount: Set(movement.amount),
        balance: Set(movement.balance),
    }
}

/// Name of the constraint quoted in a PostgreSQL violation message.
fn quoted_constraint(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once("constraint \"")?;
    rest.split_once('"').map(|(name, _)| name)
}

pub(crate) fn store_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => StoreError::UniqueViolation {
            constraint: quoted_constraint(&message).unwrap_or(&message).to_string(),
        },
        Some(SqlErr::ForeignKeyConstraintViolation(message)) => StoreError::Integrity(message),
        _ => {
            let message = err.to_string();
            if message.contains("could not serialize access") || message.contains("deadlock detected") {
                StoreError::Conflict(message)
            } else {
                StoreError::Backend(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accounts_core::store::ACCOUNT_NUMBER_CONSTRAINT;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn ts() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 2, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_account_model_round_trip() {
        let model = accounts::Model {
            id: Uuid::now_v7(),
            customer_id: Uuid::now_v7(),
            number: "478758".to_string(),
            kind: "SAVINGS".to_string(),
            initial_balance: dec!(2000.0000),
            current_balance: dec!(1425.0000),
            is_active: true,
            created_at: ts(),
            updated_at: ts(),
        };
        let account = account_from_model(model.clone()).unwrap();
        assert_eq!(account.kind, AccountKind::Savings);
        assert_eq!(account.current_balance, dec!(1425));

        let active = account_to_active(&account);
        assert_eq!(active.number, Set(model.number));
        assert_eq!(active.kind, Set("SAVINGS".to_string()));
    }

    #[test]
    fn test_unknown_movement_kind_is_integrity_error() {
        let model = movements::Model {
            id: Uuid::now_v7(),
            account_id: Uuid::now_v7(),
            occurred_at: ts(),
            description: String::new(),
            kind: "TRANSFER".to_string(),
            amount: dec!(1),
            balance: dec!(1),
        };
        assert!(matches!(
            movement_from_model(model),
            Err(StoreError::Integrity(_))
        ));
    }

    #[test]
    fn test_negative_age_is_integrity_error() {
        let model = customers::Model {
            id: Uuid::now_v7(),
            name: "Jose Lema".to_string(),
            gender: "M".to_string(),
            age: -1,
            identification: "1712345678".to_string(),
            address: "Otavalo sn y principal".to_string(),
            phone: "098254785".to_string(),
            is_active: true,
            created_at: ts(),
            updated_at: ts(),
        };
        assert!(matches!(
            customer_from_model(model),
            Err(StoreError::Integrity(_))
        ));
    }

    #[rstest]
    #[case(
        "duplicate key value violates unique constraint \"accounts_number_key\"",
        Some(ACCOUNT_NUMBER_CONSTRAINT)
    )]
    #[case("something else entirely", None)]
    fn test_quoted_constraint(#[case] message: &str, #[case] expected: Option<&str>) {
        assert_eq!(quoted_constraint(message), expected);
    }

    #[test]
    fn test_plain_errors_map_to_backend() {
        let err = store_err(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(!err.is_retryable());
    }
}
