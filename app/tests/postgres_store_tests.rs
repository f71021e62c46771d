// app/tests/postgres_store_tests.rs
//
// Runs the transactional store against a real database:
//   DATABASE_URL=postgres://... cargo test -p stockroom --test postgres_store_tests -- --ignored
mod common;

use chrono::Utc;
use common::*;
use serial_test::serial;
use stockroom::errors::AppError;
use stockroom::models::{OrderStatus, Role, User};
use stockroom::seed;
use stockroom::AppConfig;
use uuid::Uuid;

async fn pg_app() -> Option<TestApp> {
  let Ok(url) = std::env::var("DATABASE_URL") else {
    eprintln!("skipping postgres store test: DATABASE_URL not set");
    return None;
  };
  let config = AppConfig::from_lookup(|name| match name {
    "STORE_BACKEND" => Some("postgres".to_string()),
    "DATABASE_URL" => Some(url.clone()),
    "JWT_SECRET" => Some("test-secret".to_string()),
    _ => None,
  })
  .expect("postgres config");
  let store = seed::build_store(&config).await.expect("connect and migrate");
  Some(TestApp::with_store(store, config))
}

// Emails are unique in the database, so every test run gets fresh accounts.
async fn fresh_admin(app: &TestApp) -> User {
  app.create_user(&format!("admin{}", Uuid::new_v4().simple()), Role::Admin).await
}

fn fresh_name(label: &str) -> String {
  format!("{} {}", label, Uuid::new_v4().simple())
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL and a local Postgres"]
async fn fulfillment_commits_sale_stock_and_status_together() {
  let Some(app) = pg_app().await else { return };
  let admin = fresh_admin(&app).await;
  let a = app.add_product(&fresh_name("A"), 1250, 5).await;
  let b = app.add_product(&fresh_name("B"), 400, 4).await;
  let order = app.place_order(&admin, &[(a.id, 3), (b.id, 2)]).await;

  let done = app.fulfill(&admin, order.id).await.unwrap();
  let sale = done.sale.unwrap();
  assert_eq!(sale.order_id, Some(order.id));
  assert_eq!(sale.total_cents, 3 * 1250 + 2 * 400);
  assert_eq!(app.quantity_of(a.id).await, 2);
  assert_eq!(app.quantity_of(b.id).await, 2);

  let stored = app.store().get_order(order.id).await.unwrap().unwrap();
  assert_eq!(stored.status, OrderStatus::Processed);
  let stored_sale = app.store().get_sale(sale.id).await.unwrap().unwrap();
  assert_eq!(stored_sale.lines, order.lines);
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL and a local Postgres"]
async fn shortfall_inside_the_transaction_rolls_back() {
  let Some(app) = pg_app().await else { return };
  let admin = fresh_admin(&app).await;
  let a = app.add_product(&fresh_name("A"), 100, 5).await;
  let b = app.add_product(&fresh_name("B"), 100, 5).await;
  let order = app.place_order(&admin, &[(a.id, 3), (b.id, 3)]).await;
  app.set_quantity(b.id, 2).await;

  match app.store().commit_fulfillment(order.id, Utc::now()).await {
    Err(AppError::InsufficientStock(shortfalls)) => {
      assert_eq!(shortfalls.len(), 1);
      assert_eq!(shortfalls[0].product_id, b.id);
      assert_eq!((shortfalls[0].requested, shortfalls[0].available), (3, 2));
    }
    other => panic!("expected InsufficientStock, got {:?}", other),
  }

  assert_eq!(app.quantity_of(a.id).await, 5);
  assert_eq!(app.quantity_of(b.id).await, 2);
  let stored = app.store().get_order(order.id).await.unwrap().unwrap();
  assert_eq!(stored.status, OrderStatus::Pending);
  let sales = app.store().list_sales().await.unwrap();
  assert!(sales.iter().all(|s| s.order_id != Some(order.id)));
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL and a local Postgres"]
async fn second_fulfillment_is_invalid_state() {
  let Some(app) = pg_app().await else { return };
  let admin = fresh_admin(&app).await;
  let a = app.add_product(&fresh_name("A"), 100, 5).await;
  let order = app.place_order(&admin, &[(a.id, 2)]).await;

  app.store().commit_fulfillment(order.id, Utc::now()).await.unwrap();
  match app.store().commit_fulfillment(order.id, Utc::now()).await {
    Err(AppError::InvalidState { current }) => assert_eq!(current, OrderStatus::Processed),
    other => panic!("expected InvalidState, got {:?}", other),
  }
  assert_eq!(app.quantity_of(a.id).await, 3);

  match app.store().cancel_order(order.id, Utc::now()).await {
    Err(AppError::InvalidState { current }) => assert_eq!(current, OrderStatus::Processed),
    other => panic!("expected InvalidState, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL and a local Postgres"]
async fn concurrent_fulfillments_never_oversell() {
  let Some(app) = pg_app().await else { return };
  let admin = fresh_admin(&app).await;
  let a = app.add_product(&fresh_name("A"), 100, 5).await;
  let first = app.place_order(&admin, &[(a.id, 3)]).await;
  let second = app.place_order(&admin, &[(a.id, 3)]).await;

  let (r1, r2) = tokio::join!(
    app.store().commit_fulfillment(first.id, Utc::now()),
    app.store().commit_fulfillment(second.id, Utc::now()),
  );
  let succeeded = [r1.is_ok(), r2.is_ok()].iter().filter(|ok| **ok).count();
  assert_eq!(succeeded, 1);
  assert!(matches!(
    r1.err().or(r2.err()),
    Some(AppError::InsufficientStock(_))
  ));
  assert_eq!(app.quantity_of(a.id).await, 2);

  // Same order raced against itself: one sale only.
  let b = app.add_product(&fresh_name("B"), 100, 5).await;
  let order = app.place_order(&admin, &[(b.id, 1)]).await;
  let (r1, r2) = tokio::join!(
    app.store().commit_fulfillment(order.id, Utc::now()),
    app.store().commit_fulfillment(order.id, Utc::now()),
  );
  assert_eq!([r1.is_ok(), r2.is_ok()].iter().filter(|ok| **ok).count(), 1);
  assert_eq!(app.quantity_of(b.id).await, 4);
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL and a local Postgres"]
async fn restock_overflow_is_a_validation_error() {
  let Some(app) = pg_app().await else { return };
  let a = app.add_product(&fresh_name("A"), 100, 5).await;

  assert!(matches!(
    app.store().restock_product(a.id, i32::MAX, Utc::now()).await,
    Err(AppError::Validation(_))
  ));
  assert_eq!(app.quantity_of(a.id).await, 5);
  assert_eq!(app.store().restock_product(a.id, 10, Utc::now()).await.unwrap().quantity, 15);
}
