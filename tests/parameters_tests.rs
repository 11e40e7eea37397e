mod common;

use rust_decimal::Decimal;
use uuid::Uuid;

use tradelog::db::parameters_repo::{self, UpdateOutcome};
use tradelog::ledger::BuyRequest;
use tradelog::models::Currency;

async fn active_count(pool: &sqlx::PgPool) -> i64 {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM trading_parameters WHERE is_active = true")
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

#[tokio::test]
async fn test_update_unused_parameters() {
    let Some(db) = common::setup_test_db().await else { return };
    let params = common::seed_active_parameters(&db.pool).await;

    let mut input = common::parameters_input();
    input.buy_parameters.buy_in_amount = Decimal::from(25);

    let outcome = parameters_repo::update(&db.pool, params.id, &input, None)
        .await
        .unwrap();

    let UpdateOutcome::Updated(updated) = outcome else {
        panic!("expected update, got {outcome:?}");
    };
    assert_eq!(updated.id, params.id);
    assert_eq!(updated.buy_parameters.buy_in_amount, Decimal::from(25));
}

#[tokio::test]
async fn test_update_referenced_parameters_leaves_row_untouched() {
    let Some(db) = common::setup_test_db().await else { return };
    let wallet = common::seed_wallet(&db.pool, "WalletParams111").await;
    let params = common::seed_active_parameters(&db.pool).await;
    let ledger = common::simulated_ledger(&db.pool);

    ledger
        .create_buy(BuyRequest {
            wallet_id: wallet.id,
            token_address: "TokenMint111".into(),
            amount: Decimal::from(10),
            currency: Currency::Sol,
            token_name: None,
            token_symbol: None,
        })
        .await
        .unwrap();

    let mut input = common::parameters_input();
    input.buy_parameters.buy_in_amount = Decimal::from(99);

    let outcome = parameters_repo::update(&db.pool, params.id, &input, None)
        .await
        .unwrap();
    assert!(matches!(outcome, UpdateOutcome::Referenced));

    let stored = parameters_repo::get_by_id(&db.pool, params.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.buy_parameters.buy_in_amount, Decimal::from(10));
    assert_eq!(stored.updated_at, params.updated_at);
}

#[tokio::test]
async fn test_update_unknown_parameters() {
    let Some(db) = common::setup_test_db().await else { return };

    let outcome = parameters_repo::update(&db.pool, Uuid::new_v4(), &common::parameters_input(), None)
        .await
        .unwrap();

    assert!(matches!(outcome, UpdateOutcome::NotFound));
}

#[tokio::test]
async fn test_concurrent_creates_leave_one_active() {
    let Some(db) = common::setup_test_db().await else { return };
    let input = common::parameters_input();

    let (a, b) = tokio::join!(
        parameters_repo::create_active(&db.pool, &input, None),
        parameters_repo::create_active(&db.pool, &input, None),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.id, b.id);

    assert_eq!(active_count(&db.pool).await, 1);
    let active = parameters_repo::get_active(&db.pool).await.unwrap().unwrap();
    assert!(active.id == a.id || active.id == b.id);
}

#[tokio::test]
async fn test_concurrent_activations_leave_one_active() {
    let Some(db) = common::setup_test_db().await else { return };
    let first = common::seed_active_parameters(&db.pool).await;
    let second = common::seed_active_parameters(&db.pool).await;
    let third = common::seed_active_parameters(&db.pool).await;

    let (a, b) = tokio::join!(
        parameters_repo::activate(&db.pool, first.id),
        parameters_repo::activate(&db.pool, second.id),
    );
    assert!(a.unwrap().is_some());
    assert!(b.unwrap().is_some());

    assert_eq!(active_count(&db.pool).await, 1);
    let active = parameters_repo::get_active(&db.pool).await.unwrap().unwrap();
    assert_ne!(active.id, third.id);
}
