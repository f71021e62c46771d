// app/tests/sale_tests.rs
mod common;

use common::*;
use stockflow::FlowData;
use stockroom::errors::AppError;
use stockroom::models::{LineRequest, NewSale};
use stockroom::pipelines::contexts::DirectSaleCtxData;
use stockroom::services::dashboard;
use uuid::Uuid;

fn sale_request(customer: Option<&str>, lines: &[(Uuid, i32)]) -> NewSale {
  NewSale {
    customer_name: customer.map(str::to_string),
    lines: lines
      .iter()
      .map(|(product_id, quantity)| LineRequest {
        product_id: *product_id,
        quantity: *quantity,
      })
      .collect(),
  }
}

#[tokio::test]
async fn direct_sale_prices_from_catalog_and_decrements() {
  let app = TestApp::new();
  let admin = app.admin().await;
  let tape = app.add_product("Tape", 350, 20).await;
  let glue = app.add_product("Glue", 499, 3).await;

  let ctx = FlowData::new(DirectSaleCtxData::new(
    app.state.clone(),
    admin.clone(),
    sale_request(Some("  Walk-in  "), &[(tape.id, 4), (glue.id, 3)]),
  ));
  app.state.flows.run(ctx.clone()).await.unwrap();

  let sale = ctx.read().sale.clone().unwrap();
  assert_eq!(sale.total_cents, 4 * 350 + 3 * 499);
  assert_eq!(sale.order_id, None);
  assert_eq!(sale.customer_name.as_deref(), Some("Walk-in"));
  assert_eq!(app.quantity_of(tape.id).await, 16);
  assert_eq!(app.quantity_of(glue.id).await, 0);
}

#[tokio::test]
async fn direct_sale_with_shortfall_changes_nothing() {
  let app = TestApp::new();
  let admin = app.admin().await;
  let tape = app.add_product("Tape", 350, 20).await;
  let glue = app.add_product("Glue", 499, 3).await;

  let ctx = FlowData::new(DirectSaleCtxData::new(
    app.state.clone(),
    admin,
    sale_request(None, &[(tape.id, 4), (glue.id, 4)]),
  ));
  match app.state.flows.run(ctx).await {
    Err(AppError::InsufficientStock(shortfalls)) => {
      assert_eq!(shortfalls.len(), 1);
      assert_eq!(shortfalls[0].product_id, glue.id);
    }
    other => panic!("expected InsufficientStock, got {:?}", other),
  }
  assert_eq!(app.quantity_of(tape.id).await, 20);
  assert!(app.store().list_sales().await.unwrap().is_empty());
}

#[tokio::test]
async fn dashboard_summarizes_inventory_orders_and_revenue() {
  let app = TestApp::new();
  let admin = app.admin().await;
  let tape = app.add_product("Tape", 100, 20).await;
  let glue = app.add_product("Glue", 200, 4).await;

  let order = app.place_order(&admin, &[(tape.id, 2)]).await;
  app.fulfill(&admin, order.id).await.unwrap();
  app.place_order(&admin, &[(glue.id, 1)]).await;

  let summary = dashboard::load_summary(app.store(), 10).await.unwrap();
  assert_eq!(summary.total_products, 2);
  assert_eq!(summary.active_products, 2);
  assert_eq!(summary.low_stock_products, 1);
  assert_eq!(summary.inventory_value_cents, 18 * 100 + 4 * 200);
  assert_eq!(summary.pending_orders, 1);
  assert_eq!(summary.processed_orders, 1);
  assert_eq!(summary.total_sales, 1);
  assert_eq!(summary.revenue_cents, 200);
}
