//! Errors raised by customer, account and movement operations.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use accounts_shared::AppError;

use crate::store::{ACCOUNT_NUMBER_CONSTRAINT, CUSTOMER_IDENTIFICATION_CONSTRAINT, StoreError};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Not Found ==========
    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Movement not found.
    #[error("Movement not found: {0}")]
    MovementNotFound(Uuid),

    // ========== Already Exists ==========
    /// Another customer already carries this identification code.
    #[error("Customer with identification {0} already exists")]
    CustomerAlreadyExists(String),

    /// Another account already carries this number.
    #[error("Account number {0} already exists")]
    AccountNumberTaken(String),

    // ========== Business Rules ==========
    /// Balance is not positive or does not cover the debit.
    #[error("Balance unavailable on account {account_id}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        /// The account ID.
        account_id: Uuid,
        /// Balance at the time of the check.
        balance: Decimal,
        /// Requested debit amount.
        requested: Decimal,
    },

    /// Same-day debits would exceed the configured limit.
    #[error(
        "Daily withdrawal limit exceeded on account {account_id}: limit {limit}, debited today {debited_today}, requested {requested}"
    )]
    DailyLimitExceeded {
        /// The account ID.
        account_id: Uuid,
        /// Configured daily limit.
        limit: Decimal,
        /// Debits already posted today.
        debited_today: Decimal,
        /// Requested debit amount.
        requested: Decimal,
    },

    /// The entity still owns dependents and cannot be deleted.
    #[error("Cannot delete {resource} {id}: {count} dependent record(s) exist")]
    HasDependents {
        /// Kind of entity being deleted.
        resource: &'static str,
        /// The entity ID.
        id: Uuid,
        /// Number of dependents.
        count: u64,
    },

    /// No unique account number was found within the attempt budget.
    #[error("Could not allocate a unique account number after {attempts} attempts")]
    AllocationExhausted {
        /// Attempts made.
        attempts: u32,
    },

    /// Unknown movement kind.
    #[error("Invalid movement kind: {0}")]
    InvalidMovementKind(String),

    // ========== Validation ==========
    /// Unknown account kind.
    #[error("Invalid account kind: {0}")]
    InvalidAccountKind(String),

    /// Movement amount cannot be zero.
    #[error("Movement amount cannot be zero")]
    ZeroAmount,

    /// Movement amount cannot be negative.
    #[error("Movement amount cannot be negative")]
    NegativeAmount,

    /// Account is inactive and cannot receive postings.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    // ========== Store ==========
    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Translates a commit-time uniqueness violation into the matching domain error.
    #[must_use]
    pub fn from_unique_violation(err: StoreError, identification: &str, number: &str) -> Self {
        match &err {
            StoreError::UniqueViolation { constraint } if constraint == ACCOUNT_NUMBER_CONSTRAINT => {
                Self::AccountNumberTaken(number.to_string())
            }
            StoreError::UniqueViolation { constraint }
                if constraint == CUSTOMER_IDENTIFICATION_CONSTRAINT =>
            {
                Self::CustomerAlreadyExists(identification.to_string())
            }
            _ => Self::Store(err),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::MovementNotFound(_) => "MOVEMENT_NOT_FOUND",
            Self::CustomerAlreadyExists(_) => "CUSTOMER_ALREADY_EXISTS",
            Self::AccountNumberTaken(_) => "ACCOUNT_NUMBER_TAKEN",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::DailyLimitExceeded { .. } => "DAILY_LIMIT_EXCEEDED",
            Self::HasDependents { .. } => "HAS_DEPENDENTS",
            Self::AllocationExhausted { .. } => "ALLOCATION_EXHAUSTED",
            Self::InvalidMovementKind(_) => "INVALID_MOVEMENT_KIND",
            Self::InvalidAccountKind(_) => "INVALID_ACCOUNT_KIND",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::Store(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidAccountKind(_) | Self::ZeroAmount | Self::NegativeAmount => 400,

            // 404 Not Found
            Self::CustomerNotFound(_) | Self::AccountNotFound(_) | Self::MovementNotFound(_) => {
                404
            }

            // 409 Conflict
            Self::CustomerAlreadyExists(_) | Self::AccountNumberTaken(_) => 409,

            // 422 Unprocessable Entity - business rule violations
            Self::InsufficientBalance { .. }
            | Self::DailyLimitExceeded { .. }
            | Self::HasDependents { .. }
            | Self::AllocationExhausted { .. }
            | Self::InvalidMovementKind(_)
            | Self::AccountInactive(_) => 422,

            // 500 Internal Server Error
            Self::Store(_) => 500,
        }
    }

    /// Returns true if retrying the operation might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_retryable())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.http_status_code() {
            400 => Self::Validation(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            422 => Self::BusinessRule(message),
            _ => Self::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(LedgerError::AccountNotFound(Uuid::nil()), 404, "ACCOUNT_NOT_FOUND")]
    #[case(LedgerError::CustomerAlreadyExists("1712345678".into()), 409, "CUSTOMER_ALREADY_EXISTS")]
    #[case(LedgerError::AllocationExhausted { attempts: 10 }, 422, "ALLOCATION_EXHAUSTED")]
    #[case(LedgerError::InvalidMovementKind("TRANSFER".into()), 422, "INVALID_MOVEMENT_KIND")]
    #[case(LedgerError::ZeroAmount, 400, "ZERO_AMOUNT")]
    #[case(LedgerError::Store(StoreError::Backend("down".into())), 500, "DATABASE_ERROR")]
    fn test_status_and_code(
        #[case] err: LedgerError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        assert_eq!(err.http_status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_daily_limit_maps_to_business_rule() {
        let err = LedgerError::DailyLimitExceeded {
            account_id: Uuid::nil(),
            limit: dec!(1000),
            debited_today: dec!(950),
            requested: dec!(100),
        };
        let app: AppError = err.into();
        assert!(matches!(app, AppError::BusinessRule(_)));
        assert_eq!(app.status_code(), 422);
    }

    #[test]
    fn test_unique_violation_translation() {
        let err = LedgerError::from_unique_violation(
            StoreError::UniqueViolation {
                constraint: ACCOUNT_NUMBER_CONSTRAINT.into(),
            },
            "",
            "100001",
        );
        assert!(matches!(err, LedgerError::AccountNumberTaken(ref n) if n == "100001"));

        let err = LedgerError::from_unique_violation(
            StoreError::UniqueViolation {
                constraint: CUSTOMER_IDENTIFICATION_CONSTRAINT.into(),
            },
            "1712345678",
            "",
        );
        assert!(matches!(err, LedgerError::CustomerAlreadyExists(_)));

        let err = LedgerError::from_unique_violation(StoreError::Conflict("x".into()), "", "");
        assert!(err.is_retryable());
    }
}
