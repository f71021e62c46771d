// app/src/models/line_item.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One requested `(product, quantity)` pair, as sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
  pub product_id: Uuid,
  pub quantity: i32,
}

/// A line of an order or sale. `name` and `price_cents` are copied from the
/// product when the line is created and never follow later product edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
  pub product_id: Uuid,
  pub name: String,
  pub quantity: i32,
  pub price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortfall {
  pub product_id: Uuid,
  pub name: String,
  pub requested: i64,
  pub available: i64,
}
