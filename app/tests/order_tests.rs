// app/tests/order_tests.rs
mod common;

use chrono::Utc;
use common::*;
use stockroom::errors::AppError;
use stockroom::models::{OrderStatus, ProductUpdate};
use uuid::Uuid;

#[tokio::test]
async fn order_lines_snapshot_catalog_name_and_price() {
  let app = TestApp::new();
  let clerk = app.clerk().await;
  let drill = app.add_product("Cordless Drill", 8999, 7).await;

  let order = app.place_order(&clerk, &[(drill.id, 2)]).await;
  assert_eq!(order.user_id, clerk.id);
  assert_eq!(order.status, OrderStatus::Pending);
  assert_eq!(order.lines.len(), 1);
  assert_eq!(order.lines[0].name, "Cordless Drill");
  assert_eq!(order.lines[0].price_cents, 8999);
  assert_eq!(order.lines[0].quantity, 2);
}

#[tokio::test]
async fn snapshots_survive_later_product_edits() {
  let app = TestApp::new();
  let admin = app.admin().await;
  let drill = app.add_product("Cordless Drill", 8999, 7).await;
  let order = app.place_order(&admin, &[(drill.id, 2)]).await;

  let edit = ProductUpdate {
    name: Some("Cordless Drill v2".to_string()),
    price_cents: Some(12999),
    ..Default::default()
  };
  app.store().update_product(drill.id, &edit, Utc::now()).await.unwrap();

  let stored = app.store().get_order(order.id).await.unwrap().unwrap();
  assert_eq!(stored.lines[0].name, "Cordless Drill");
  assert_eq!(stored.lines[0].price_cents, 8999);

  let sale = app.fulfill(&admin, order.id).await.unwrap().sale.unwrap();
  assert_eq!(sale.total_cents, 2 * 8999);
  assert_eq!(sale.lines[0].name, "Cordless Drill");
}

#[tokio::test]
async fn invalid_orders_are_rejected() {
  let app = TestApp::new();
  let clerk = app.clerk().await;
  let drill = app.add_product("Drill", 100, 7).await;

  assert!(matches!(
    app.try_place_order(&clerk, &[]).await,
    Err(AppError::Validation(_))
  ));
  assert!(matches!(
    app.try_place_order(&clerk, &[(drill.id, 0)]).await,
    Err(AppError::Validation(_))
  ));
  assert!(matches!(
    app.try_place_order(&clerk, &[(Uuid::new_v4(), 1)]).await,
    Err(AppError::NotFound(_))
  ));

  let retire = ProductUpdate {
    active: Some(false),
    ..Default::default()
  };
  app.store().update_product(drill.id, &retire, Utc::now()).await.unwrap();
  assert!(matches!(
    app.try_place_order(&clerk, &[(drill.id, 1)]).await,
    Err(AppError::Validation(_))
  ));
  assert!(app.store().list_orders(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn placement_reports_all_shortfalls_and_saves_nothing() {
  let app = TestApp::new();
  let clerk = app.clerk().await;
  let a = app.add_product("A", 100, 5).await;
  let b = app.add_product("B", 100, 2).await;

  match app.try_place_order(&clerk, &[(a.id, 3), (b.id, 3), (a.id, 3)]).await {
    Err(AppError::InsufficientStock(shortfalls)) => {
      assert_eq!(shortfalls.len(), 2);
      assert_eq!((shortfalls[0].product_id, shortfalls[0].requested), (a.id, 6));
      assert_eq!((shortfalls[1].product_id, shortfalls[1].requested), (b.id, 3));
    }
    other => panic!("expected InsufficientStock, got {:?}", other),
  }
  assert!(app.store().list_orders(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn cancel_is_only_allowed_from_pending() {
  let app = TestApp::new();
  let admin = app.admin().await;
  let drill = app.add_product("Drill", 100, 7).await;
  let order = app.place_order(&admin, &[(drill.id, 1)]).await;

  let cancelled = app.store().cancel_order(order.id, Utc::now()).await.unwrap();
  assert_eq!(cancelled.status, OrderStatus::Cancelled);

  match app.store().cancel_order(order.id, Utc::now()).await {
    Err(AppError::InvalidState { current }) => assert_eq!(current, OrderStatus::Cancelled),
    other => panic!("expected InvalidState, got {:?}", other),
  }
}

#[tokio::test]
async fn deleting_an_order_keeps_its_sale() {
  let app = TestApp::new();
  let admin = app.admin().await;
  let drill = app.add_product("Drill", 100, 7).await;
  let order = app.place_order(&admin, &[(drill.id, 2)]).await;
  let sale = app.fulfill(&admin, order.id).await.unwrap().sale.unwrap();

  app.store().delete_order(order.id).await.unwrap();
  assert!(app.store().get_order(order.id).await.unwrap().is_none());

  let kept = app.store().get_sale(sale.id).await.unwrap().unwrap();
  assert_eq!(kept.order_id, None);
  assert_eq!(kept.lines, sale.lines);
  assert!(matches!(
    app.store().delete_order(order.id).await,
    Err(AppError::NotFound(_))
  ));
}

#[tokio::test]
async fn orders_are_listed_per_owner_newest_first() {
  let app = TestApp::new();
  let admin = app.admin().await;
  let clerk = app.clerk().await;
  let drill = app.add_product("Drill", 100, 50).await;

  let first = app.place_order(&clerk, &[(drill.id, 1)]).await;
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  let second = app.place_order(&clerk, &[(drill.id, 1)]).await;
  app.place_order(&admin, &[(drill.id, 1)]).await;

  let mine: Vec<Uuid> = app
    .store()
    .list_orders(Some(clerk.id))
    .await
    .unwrap()
    .iter()
    .map(|o| o.id)
    .collect();
  assert_eq!(mine, vec![second.id, first.id]);
  assert_eq!(app.store().list_orders(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn restock_overflow_is_a_validation_error() {
  let app = TestApp::new();
  let drill = app.add_product("Drill", 100, 5).await;

  assert!(matches!(
    app.store().restock_product(drill.id, i32::MAX, Utc::now()).await,
    Err(AppError::Validation(_))
  ));
  assert_eq!(app.quantity_of(drill.id).await, 5);
  assert_eq!(app.store().restock_product(drill.id, 10, Utc::now()).await.unwrap().quantity, 15);
}
