//! Property-based tests for the debit guard boundaries.

use accounts_shared::types::CustomerId;
use chrono::NaiveDateTime;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::guard::DebitGuard;
use crate::account::{Account, AccountKind, NewAccount};

/// Amounts from 0.01 to 10,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn account(balance: Decimal) -> Account {
    Account::open(
        NewAccount {
            customer_id: CustomerId::new(),
            kind: AccountKind::Checking,
            initial_balance: balance,
            current_balance: None,
            is_active: true,
        },
        "225487".to_string(),
        NaiveDateTime::default(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A debit larger than the balance is always rejected as insufficient.
    #[test]
    fn prop_overdraft_rejected(balance in amount(), extra in amount(), limit in amount()) {
        let guard = DebitGuard::new(limit);
        let err = guard.check(&account(balance), balance + extra, Decimal::ZERO).unwrap_err();
        let is_insufficient = matches!(err, LedgerError::InsufficientBalance { .. });
        prop_assert!(is_insufficient);
    }

    /// Filling the remaining daily quota exactly passes; one cent more fails.
    #[test]
    fn prop_limit_boundary(limit in amount(), used_cents in 0i64..100) {
        let debited = (limit * Decimal::new(used_cents, 2)).round_dp(2);
        let remaining = limit - debited;
        prop_assume!(remaining > Decimal::ZERO);

        let guard = DebitGuard::new(limit);
        let rich = account(limit * Decimal::TWO + Decimal::ONE);

        prop_assert!(guard.check(&rich, remaining, debited).is_ok());

        let over = guard.check(&rich, remaining + Decimal::new(1, 2), debited);
        let is_limit = matches!(over, Err(LedgerError::DailyLimitExceeded { .. }));
        prop_assert!(is_limit);
    }
}
