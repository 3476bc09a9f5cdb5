//! Property-based tests for the balance invariant.
//!
//! After any sequence of postings and reversals, an account's balance equals
//! its initial balance plus the credits minus the debits that remain attached.

use std::sync::Arc;

use accounts_shared::types::{CustomerId, PageRequest};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::{DebitGuard, LedgerEngine, MovementKind, NewMovement};
use crate::account::{Account, AccountKind, NewAccount};
use crate::clock::FixedClock;
use crate::customer::{Customer, NewCustomer};
use crate::store::{InMemoryStore, LedgerStore, MovementQuery, StoreTx};

#[derive(Debug, Clone)]
enum Step {
    Post(MovementKind, Decimal),
    Reverse(usize),
}

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..200_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (prop_oneof![Just(MovementKind::Credit), Just(MovementKind::Debit)], amount())
            .prop_map(|(kind, amount)| Step::Post(kind, amount)),
        1 => (0usize..32).prop_map(Step::Reverse),
    ]
}

fn run(initial: Decimal, steps: Vec<Step>) -> (Decimal, Decimal) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    rt.block_on(async move {
        let now = NaiveDate::from_ymd_opt(2022, 2, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let store = Arc::new(InMemoryStore::new());
        let engine = LedgerEngine::new(
            Arc::clone(&store),
            DebitGuard::new(Decimal::new(1000, 0)),
            Arc::new(FixedClock::new(now)),
        );

        let customer = Customer::register(
            NewCustomer {
                name: "Juan Osorio".to_string(),
                gender: "M".to_string(),
                age: 41,
                identification: format!("ID-{}", CustomerId::new()),
                address: "13 junio y Equinoccial".to_string(),
                phone: "098874587".to_string(),
                is_active: true,
            },
            now,
        );
        let account = Account::open(
            NewAccount {
                customer_id: customer.id,
                kind: AccountKind::Checking,
                initial_balance: initial,
                current_balance: None,
                is_active: true,
            },
            "585545".to_string(),
            now,
        );
        let mut tx = store.begin().await.unwrap();
        tx.save_customer(&customer).await.unwrap();
        tx.save_account(&account).await.unwrap();
        tx.commit().await.unwrap();

        let mut posted = Vec::new();
        for step in steps {
            match step {
                Step::Post(kind, amount) => {
                    let input = NewMovement {
                        account_id: account.id,
                        kind,
                        amount,
                        description: String::new(),
                    };
                    if let Ok(m) = engine.create(input).await {
                        posted.push(m.id);
                    }
                }
                Step::Reverse(i) if !posted.is_empty() => {
                    let id = posted.remove(i % posted.len());
                    engine.reverse(id).await.unwrap();
                }
                Step::Reverse(_) => {}
            }
        }

        let movements = engine
            .list(&MovementQuery {
                account_id: Some(account.id),
                page: PageRequest::new(1, 1000),
                ..MovementQuery::default()
            })
            .await
            .unwrap()
            .data;
        let net: Decimal = movements
            .iter()
            .map(|m| match m.kind {
                MovementKind::Credit => m.amount,
                MovementKind::Debit => -m.amount,
            })
            .sum();

        let mut tx = store.begin().await.unwrap();
        let balance = tx.load_account(account.id).await.unwrap().unwrap().current_balance;
        (balance, initial + net)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_balance_matches_history(
        initial in amount(),
        steps in prop::collection::vec(step(), 0..40),
    ) {
        let (balance, expected) = run(initial, steps);
        prop_assert_eq!(balance, expected);
    }
}
