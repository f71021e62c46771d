// app/src/pipelines/common_steps.rs

//! Steps shared by the order placement, direct sale and fulfillment workflows.

use crate::errors::{AppError, Result};
use crate::models::{LineItem, LineRequest};
use crate::services::inventory::{aggregate_demand, find_shortfalls, index_by_id};
use crate::store::InventoryStore;
use tracing::{event, instrument, warn, Level};

/// Turns client line requests into line items priced and named from the
/// current catalog. Inactive or unknown products are rejected.
#[instrument(name = "common_steps::snapshot_lines", skip_all, fields(num_lines = requests.len()), err(Display))]
pub async fn snapshot_lines(store: &dyn InventoryStore, requests: &[LineRequest]) -> Result<Vec<LineItem>> {
  if requests.is_empty() {
    return Err(AppError::Validation("At least one line item is required.".to_string()));
  }
  if let Some(bad) = requests.iter().find(|r| r.quantity <= 0) {
    return Err(AppError::Validation(format!(
      "Quantity for product {} must be greater than zero.",
      bad.product_id
    )));
  }

  let ids: Vec<_> = requests.iter().map(|r| r.product_id).collect();
  let catalog = index_by_id(store.get_products(&ids).await?);

  requests
    .iter()
    .map(|req| {
      let product = catalog
        .get(&req.product_id)
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", req.product_id)))?;
      if !product.active {
        return Err(AppError::Validation(format!("Product '{}' is no longer available.", product.name)));
      }
      Ok(LineItem {
        product_id: product.id,
        name: product.name.clone(),
        quantity: req.quantity,
        price_cents: product.price_cents,
      })
    })
    .collect()
}

/// Reports every shortfall for `lines` against current stock. Advisory:
/// the store repeats this check inside its write boundary.
#[instrument(name = "common_steps::check_stock", skip_all, fields(num_lines = lines.len()), err(Display))]
pub async fn check_stock(store: &dyn InventoryStore, lines: &[LineItem]) -> Result<()> {
  let demand = aggregate_demand(lines.iter().map(|l| (l.product_id, l.quantity)));
  let ids: Vec<_> = demand.iter().map(|(id, _)| *id).collect();
  let products = index_by_id(store.get_products(&ids).await?);
  let shortfalls = find_shortfalls(&demand, &products)?;
  if shortfalls.is_empty() {
    event!(Level::DEBUG, "Stock covers every line.");
    return Ok(());
  }
  warn!(short_items = shortfalls.len(), "Insufficient stock.");
  Err(AppError::InsufficientStock(shortfalls))
}

pub fn validate_customer_name(name: &str) -> Result<String> {
  let trimmed = name.trim();
  if trimmed.is_empty() {
    return Err(AppError::Validation("Customer name is required.".to_string()));
  }
  Ok(trimmed.to_string())
}
