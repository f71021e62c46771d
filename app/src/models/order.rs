// app/src/models/order.rs

use super::line_item::{LineItem, LineRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type as SqlxType;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processed,
  Cancelled,
}

impl OrderStatus {
  pub fn is_terminal(self) -> bool {
    !matches!(self, OrderStatus::Pending)
  }
}

impl std::fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let label = match self {
      OrderStatus::Pending => "Pending",
      OrderStatus::Processed => "Processed",
      OrderStatus::Cancelled => "Cancelled",
    };
    f.write_str(label)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub customer_name: String,
  pub contact_info: Option<String>,
  pub lines: Vec<LineItem>,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Client payload for placing an order. Prices and names are never taken
/// from the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
  pub customer_name: String,
  #[serde(default)]
  pub contact_info: Option<String>,
  pub lines: Vec<LineRequest>,
}
