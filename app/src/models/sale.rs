// app/src/models/sale.rs

use super::line_item::{LineItem, LineRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finalized sale. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
  pub id: Uuid,
  pub order_id: Option<Uuid>,
  pub customer_name: Option<String>,
  pub lines: Vec<LineItem>,
  pub total_cents: i64,
  pub sold_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
  #[serde(default)]
  pub customer_name: Option<String>,
  pub lines: Vec<LineRequest>,
}
