// app/src/services/inventory.rs

//! Stock arithmetic shared by the workflows and both store backends.

use crate::errors::{AppError, Result};
use crate::models::{LineItem, Product, Shortfall};
use std::collections::HashMap;
use uuid::Uuid;

/// Sums requested quantities per product, keeping first-seen order.
pub fn aggregate_demand(lines: impl IntoIterator<Item = (Uuid, i32)>) -> Vec<(Uuid, i64)> {
  let mut demand: Vec<(Uuid, i64)> = Vec::new();
  let mut index: HashMap<Uuid, usize> = HashMap::new();
  for (product_id, quantity) in lines {
    match index.get(&product_id) {
      Some(&i) => demand[i].1 += i64::from(quantity),
      None => {
        index.insert(product_id, demand.len());
        demand.push((product_id, i64::from(quantity)));
      }
    }
  }
  demand
}

/// Every product whose stock cannot cover its demand. A product missing from
/// `products` is `NotFound`.
pub fn find_shortfalls(demand: &[(Uuid, i64)], products: &HashMap<Uuid, Product>) -> Result<Vec<Shortfall>> {
  let mut shortfalls = Vec::new();
  for (product_id, requested) in demand {
    let product = products
      .get(product_id)
      .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", product_id)))?;
    let available = i64::from(product.quantity);
    if *requested > available {
      shortfalls.push(Shortfall {
        product_id: *product_id,
        name: product.name.clone(),
        requested: *requested,
        available,
      });
    }
  }
  Ok(shortfalls)
}

/// Σ(price × quantity). Overflow is a validation failure, not a wrap.
pub fn sale_total_cents(lines: &[LineItem]) -> Result<i64> {
  lines.iter().try_fold(0i64, |acc, line| {
    line
      .price_cents
      .checked_mul(i64::from(line.quantity))
      .and_then(|subtotal| acc.checked_add(subtotal))
      .ok_or_else(|| AppError::Validation("Sale total is out of range.".to_string()))
  })
}

/// Quantity after adding `amount`. Overflow and negative results are
/// validation errors on every backend.
pub fn restocked_quantity(current: i32, amount: i32) -> Result<i32> {
  current
    .checked_add(amount)
    .filter(|q| *q >= 0)
    .ok_or_else(|| AppError::Validation("Quantity is out of range.".to_string()))
}

pub fn index_by_id(products: Vec<Product>) -> HashMap<Uuid, Product> {
  products.into_iter().map(|p| (p.id, p)).collect()
}
