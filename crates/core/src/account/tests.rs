//! Tests for the account registry.

use std::sync::Arc;

use accounts_shared::types::{AccountId, CustomerId, PageRequest};
use accounts_shared::LedgerConfig;
use rust_decimal_macros::dec;

use super::{
    AccountKind, AccountNumberAllocator, AccountPatch, AccountService, NewAccount, NumberGenerator,
};
use crate::clock::SystemClock;
use crate::customer::{CustomerService, NewCustomer};
use crate::ledger::{DebitGuard, LedgerEngine, LedgerError, MovementKind, NewMovement};
use crate::store::{AccountQuery, InMemoryStore, LedgerStore, StoreTx};

struct Fixture {
    store: Arc<InMemoryStore>,
    customers: CustomerService<InMemoryStore>,
    accounts: AccountService<InMemoryStore>,
    engine: LedgerEngine<InMemoryStore>,
}

fn fixture(config: &LedgerConfig) -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(SystemClock);
    Fixture {
        customers: CustomerService::new(Arc::clone(&store), clock.clone()),
        accounts: AccountService::new(
            Arc::clone(&store),
            AccountNumberAllocator::from_config(config),
            clock.clone(),
        ),
        engine: LedgerEngine::new(
            Arc::clone(&store),
            DebitGuard::new(config.daily_withdrawal_limit),
            clock,
        ),
        store,
    }
}

async fn customer(fx: &Fixture, identification: &str) -> CustomerId {
    fx.customers
        .register(NewCustomer {
            name: "Jose Lema".to_string(),
            gender: "M".to_string(),
            age: 35,
            identification: identification.to_string(),
            address: "Otavalo sn y principal".to_string(),
            phone: "098254785".to_string(),
            is_active: true,
        })
        .await
        .unwrap()
        .id
}

fn new_account(customer_id: CustomerId) -> NewAccount {
    NewAccount {
        customer_id,
        kind: AccountKind::Savings,
        initial_balance: dec!(2000),
        current_balance: None,
        is_active: true,
    }
}

#[tokio::test]
async fn test_open_allocates_sequential_numbers() {
    let fx = fixture(&LedgerConfig::default());
    let owner = customer(&fx, "1712345678").await;

    let first = fx.accounts.open(new_account(owner)).await.unwrap();
    let second = fx.accounts.open(new_account(owner)).await.unwrap();

    assert_eq!(first.number, "100000");
    assert_eq!(second.number, "100001");
    assert_eq!(first.current_balance, dec!(2000));
}

#[tokio::test]
async fn test_open_random_policy_yields_distinct_numbers() {
    let config = LedgerConfig {
        account_number_policy: accounts_shared::AccountNumberPolicy::Random,
        ..LedgerConfig::default()
    };
    let fx = fixture(&config);
    let owner = customer(&fx, "1712345678").await;

    let mut numbers = Vec::new();
    for _ in 0..20 {
        numbers.push(fx.accounts.open(new_account(owner)).await.unwrap().number);
    }
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 20);
}

#[tokio::test]
async fn test_open_for_unknown_customer() {
    let fx = fixture(&LedgerConfig::default());
    let err = fx
        .accounts
        .open(new_account(CustomerId::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::CustomerNotFound(_)));
}

#[tokio::test]
async fn test_patch_changes_kind_and_status_only() {
    let fx = fixture(&LedgerConfig::default());
    let owner = customer(&fx, "1712345678").await;
    let account = fx.accounts.open(new_account(owner)).await.unwrap();

    let patched = fx
        .accounts
        .patch(
            account.id,
            AccountPatch {
                kind: Some(AccountKind::Checking),
                is_active: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(patched.kind, AccountKind::Checking);
    assert!(patched.is_active);
    assert_eq!(patched.number, account.number);
    assert_eq!(patched.current_balance, account.current_balance);
}

#[tokio::test]
async fn test_delete_with_movements_rejected_until_reversed() {
    let fx = fixture(&LedgerConfig::default());
    let owner = customer(&fx, "1712345678").await;
    let account = fx.accounts.open(new_account(owner)).await.unwrap();
    let movement = fx
        .engine
        .create(NewMovement {
            account_id: account.id,
            kind: MovementKind::Credit,
            amount: dec!(600),
            description: "Deposito".to_string(),
        })
        .await
        .unwrap();

    let err = fx.accounts.delete(account.id).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::HasDependents { resource: "account", count: 1, .. }
    ));

    fx.engine.delete(movement.id).await.unwrap();
    fx.accounts.delete(account.id).await.unwrap();
    assert!(matches!(
        fx.accounts.get(account.id).await,
        Err(LedgerError::AccountNotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_unknown_account() {
    let fx = fixture(&LedgerConfig::default());
    assert!(matches!(
        fx.accounts.delete(AccountId::new()).await,
        Err(LedgerError::AccountNotFound(_))
    ));
}

#[tokio::test]
async fn test_list_filters_by_customer() {
    let fx = fixture(&LedgerConfig::default());
    let a = customer(&fx, "1").await;
    let b = customer(&fx, "2").await;
    fx.accounts.open(new_account(a)).await.unwrap();
    fx.accounts.open(new_account(a)).await.unwrap();
    fx.accounts.open(new_account(b)).await.unwrap();

    let page = fx
        .accounts
        .list(&AccountQuery {
            customer_id: Some(a),
            page: PageRequest::default(),
            ..AccountQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(page.meta.total, 2);
    assert!(page.data.iter().all(|acc| acc.customer_id == a));
    assert!(page.data[0].number < page.data[1].number);
}

/// Always proposes the same number.
struct Fixed(&'static str);

impl NumberGenerator for Fixed {
    fn propose(&self, _existing: &[String], _attempt: u32) -> String {
        self.0.to_string()
    }
}

#[tokio::test]
async fn test_exhausted_allocation_creates_no_account() {
    let fx = fixture(&LedgerConfig::default());
    let owner = customer(&fx, "1712345678").await;
    let first = fx.accounts.open(new_account(owner)).await.unwrap();
    assert_eq!(first.number, "100000");

    let colliding = AccountService::new(
        Arc::clone(&fx.store),
        AccountNumberAllocator::new(Arc::new(Fixed("100000")), 3),
        Arc::new(SystemClock),
    );
    let err = colliding.open(new_account(owner)).await.unwrap_err();
    assert!(matches!(err, LedgerError::AllocationExhausted { attempts: 3 }));

    let page = fx
        .accounts
        .list(&AccountQuery {
            customer_id: Some(owner),
            ..AccountQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);

    let mut tx = fx.store.begin().await.unwrap();
    assert_eq!(tx.count_accounts_for_customer(owner).await.unwrap(), 1);
    assert_eq!(tx.list_account_numbers().await.unwrap(), vec!["100000"]);
}
