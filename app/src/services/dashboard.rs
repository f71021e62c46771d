// app/src/services/dashboard.rs

use crate::errors::Result;
use crate::models::{Order, OrderStatus, Product, Sale};
use crate::store::InventoryStore;
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
  pub total_products: usize,
  pub active_products: usize,
  pub low_stock_products: usize,
  /// Σ price × quantity over active products.
  pub inventory_value_cents: i64,
  pub pending_orders: usize,
  pub processed_orders: usize,
  pub cancelled_orders: usize,
  pub total_sales: usize,
  pub revenue_cents: i64,
}

pub fn is_low_stock(product: &Product, threshold: i32) -> bool {
  product.active && product.quantity < threshold
}

pub fn summarize(products: &[Product], orders: &[Order], sales: &[Sale], low_stock_threshold: i32) -> DashboardSummary {
  let active: Vec<&Product> = products.iter().filter(|p| p.active).collect();
  let count_status = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();

  DashboardSummary {
    total_products: products.len(),
    active_products: active.len(),
    low_stock_products: active.iter().filter(|p| is_low_stock(p, low_stock_threshold)).count(),
    inventory_value_cents: active
      .iter()
      .map(|p| p.price_cents.saturating_mul(i64::from(p.quantity)))
      .fold(0i64, i64::saturating_add),
    pending_orders: count_status(OrderStatus::Pending),
    processed_orders: count_status(OrderStatus::Processed),
    cancelled_orders: count_status(OrderStatus::Cancelled),
    total_sales: sales.len(),
    revenue_cents: sales.iter().map(|s| s.total_cents).fold(0i64, i64::saturating_add),
  }
}

#[instrument(name = "dashboard::load_summary", skip(store))]
pub async fn load_summary(store: &dyn InventoryStore, low_stock_threshold: i32) -> Result<DashboardSummary> {
  let products = store.list_products(true).await?;
  let orders = store.list_orders(None).await?;
  let sales = store.list_sales().await?;
  Ok(summarize(&products, &orders, &sales, low_stock_threshold))
}
