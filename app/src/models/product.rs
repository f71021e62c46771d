// app/src/models/product.rs

use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub sku: String,
  pub name: String,
  pub category: String,
  pub price_cents: i64,
  pub quantity: i32,
  pub active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// `PUR-` followed by six random digits.
pub fn generate_sku() -> String {
  format!("PUR-{:06}", OsRng.next_u32() % 1_000_000)
}

fn required_text(field: &str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(AppError::Validation(format!("{} is required.", field)));
  }
  Ok(trimmed.to_string())
}

fn non_negative_price(price_cents: i64) -> Result<i64> {
  if price_cents < 0 {
    return Err(AppError::Validation("Price cannot be negative.".to_string()));
  }
  Ok(price_cents)
}

fn non_negative_quantity(quantity: i32) -> Result<i32> {
  if quantity < 0 {
    return Err(AppError::Validation("Quantity cannot be negative.".to_string()));
  }
  Ok(quantity)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub name: String,
  pub category: String,
  pub price_cents: i64,
  pub quantity: i32,
}

impl NewProduct {
  /// Checks the fields and builds an active product with a fresh id and SKU.
  pub fn into_product(self, now: DateTime<Utc>) -> Result<Product> {
    Ok(Product {
      id: Uuid::new_v4(),
      sku: generate_sku(),
      name: required_text("Name", &self.name)?,
      category: required_text("Category", &self.category)?,
      price_cents: non_negative_price(self.price_cents)?,
      quantity: non_negative_quantity(self.quantity)?,
      active: true,
      created_at: now,
      updated_at: now,
    })
  }
}

/// Partial update; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
  pub name: Option<String>,
  pub category: Option<String>,
  pub price_cents: Option<i64>,
  pub quantity: Option<i32>,
  pub active: Option<bool>,
}

impl ProductUpdate {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.category.is_none()
      && self.price_cents.is_none()
      && self.quantity.is_none()
      && self.active.is_none()
  }

  pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) -> Result<()> {
    if self.is_empty() {
      return Err(AppError::Validation("No fields to update.".to_string()));
    }
    if let Some(name) = &self.name {
      product.name = required_text("Name", name)?;
    }
    if let Some(category) = &self.category {
      product.category = required_text("Category", category)?;
    }
    if let Some(price) = self.price_cents {
      product.price_cents = non_negative_price(price)?;
    }
    if let Some(quantity) = self.quantity {
      product.quantity = non_negative_quantity(quantity)?;
    }
    if let Some(active) = self.active {
      product.active = active;
    }
    product.updated_at = now;
    Ok(())
  }
}
