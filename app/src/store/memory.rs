// app/src/store/memory.rs

//! In-process store. One write lock covers every table, so each
//! multi-record operation is atomic.

use super::InventoryStore;
use crate::errors::{AppError, Result};
use crate::models::{Order, OrderStatus, Product, ProductUpdate, Sale, User};
use crate::services::inventory::{aggregate_demand, find_shortfalls, restocked_quantity, sale_total_cents};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
  products: HashMap<Uuid, Product>,
  orders: HashMap<Uuid, Order>,
  sales: HashMap<Uuid, Sale>,
  users: HashMap<Uuid, User>,
}

impl Tables {
  fn product_mut(&mut self, id: Uuid) -> Result<&mut Product> {
    self
      .products
      .get_mut(&id)
      .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", id)))
  }

  fn user_mut(&mut self, id: Uuid) -> Result<&mut User> {
    self
      .users
      .get_mut(&id)
      .ok_or_else(|| AppError::NotFound(format!("User {} not found.", id)))
  }

  /// Checks stock for `demand` and, if every product is covered, applies the
  /// decrement. Nothing is touched on failure.
  fn take_stock(&mut self, demand: &[(Uuid, i64)], now: DateTime<Utc>) -> Result<()> {
    let snapshot: HashMap<Uuid, Product> = demand
      .iter()
      .filter_map(|(id, _)| self.products.get(id).map(|p| (*id, p.clone())))
      .collect();
    let shortfalls = find_shortfalls(demand, &snapshot)?;
    if !shortfalls.is_empty() {
      return Err(AppError::InsufficientStock(shortfalls));
    }
    for (product_id, requested) in demand {
      let product = self.product_mut(*product_id)?;
      let requested = i32::try_from(*requested)
        .map_err(|_| AppError::Validation("Requested quantity is out of range.".to_string()))?;
      product.quantity -= requested;
      product.updated_at = now;
    }
    Ok(())
  }
}

#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

fn newest_first<T>(mut items: Vec<T>, key: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
  items.sort_by(|a, b| key(b).cmp(&key(a)));
  items
}

#[async_trait]
impl InventoryStore for MemoryStore {
  async fn insert_product(&self, product: Product) -> Result<Product> {
    let mut tables = self.tables.write();
    if tables.products.values().any(|p| p.sku == product.sku) {
      return Err(AppError::Internal(format!("SKU {} already in use.", product.sku)));
    }
    tables.products.insert(product.id, product.clone());
    Ok(product)
  }

  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    Ok(self.tables.read().products.get(&id).cloned())
  }

  async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    Ok(ids.iter().filter_map(|id| tables.products.get(id).cloned()).collect())
  }

  async fn list_products(&self, include_inactive: bool) -> Result<Vec<Product>> {
    let mut products: Vec<Product> = self
      .tables
      .read()
      .products
      .values()
      .filter(|p| include_inactive || p.active)
      .cloned()
      .collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
  }

  async fn update_product(&self, id: Uuid, update: &ProductUpdate, now: DateTime<Utc>) -> Result<Product> {
    let mut tables = self.tables.write();
    let product = tables.product_mut(id)?;
    let mut edited = product.clone();
    update.apply_to(&mut edited, now)?;
    *product = edited.clone();
    Ok(edited)
  }

  async fn restock_product(&self, id: Uuid, amount: i32, now: DateTime<Utc>) -> Result<Product> {
    let mut tables = self.tables.write();
    let product = tables.product_mut(id)?;
    product.quantity = restocked_quantity(product.quantity, amount)?;
    product.updated_at = now;
    Ok(product.clone())
  }

  async fn insert_order(&self, order: Order) -> Result<Order> {
    self.tables.write().orders.insert(order.id, order.clone());
    Ok(order)
  }

  async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    Ok(self.tables.read().orders.get(&id).cloned())
  }

  async fn list_orders(&self, user_id: Option<Uuid>) -> Result<Vec<Order>> {
    let orders = self
      .tables
      .read()
      .orders
      .values()
      .filter(|o| user_id.map_or(true, |uid| o.user_id == uid))
      .cloned()
      .collect();
    Ok(newest_first(orders, |o| o.created_at))
  }

  async fn cancel_order(&self, id: Uuid, now: DateTime<Utc>) -> Result<Order> {
    let mut tables = self.tables.write();
    let order = tables
      .orders
      .get_mut(&id)
      .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", id)))?;
    if order.status != OrderStatus::Pending {
      return Err(AppError::InvalidState { current: order.status });
    }
    order.status = OrderStatus::Cancelled;
    order.updated_at = now;
    Ok(order.clone())
  }

  async fn delete_order(&self, id: Uuid) -> Result<()> {
    let mut tables = self.tables.write();
    if tables.orders.remove(&id).is_none() {
      return Err(AppError::NotFound(format!("Order {} not found.", id)));
    }
    for sale in tables.sales.values_mut().filter(|s| s.order_id == Some(id)) {
      sale.order_id = None;
    }
    Ok(())
  }

  async fn list_sales(&self) -> Result<Vec<Sale>> {
    let sales = self.tables.read().sales.values().cloned().collect();
    Ok(newest_first(sales, |s| s.sold_at))
  }

  async fn get_sale(&self, id: Uuid) -> Result<Option<Sale>> {
    Ok(self.tables.read().sales.get(&id).cloned())
  }

  async fn commit_fulfillment(&self, order_id: Uuid, sold_at: DateTime<Utc>) -> Result<(Order, Sale)> {
    let mut tables = self.tables.write();
    let order = tables
      .orders
      .get(&order_id)
      .cloned()
      .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_id)))?;
    if order.status != OrderStatus::Pending {
      return Err(AppError::InvalidState { current: order.status });
    }

    let total_cents = sale_total_cents(&order.lines)?;
    let demand = aggregate_demand(order.lines.iter().map(|l| (l.product_id, l.quantity)));
    tables.take_stock(&demand, sold_at)?;

    let sale = Sale {
      id: Uuid::new_v4(),
      order_id: Some(order.id),
      customer_name: Some(order.customer_name.clone()),
      lines: order.lines.clone(),
      total_cents,
      sold_at,
    };
    tables.sales.insert(sale.id, sale.clone());

    let mut processed = order;
    processed.status = OrderStatus::Processed;
    processed.updated_at = sold_at;
    tables.orders.insert(processed.id, processed.clone());
    Ok((processed, sale))
  }

  async fn commit_sale(&self, sale: Sale) -> Result<Sale> {
    let mut tables = self.tables.write();
    let demand = aggregate_demand(sale.lines.iter().map(|l| (l.product_id, l.quantity)));
    tables.take_stock(&demand, sale.sold_at)?;
    tables.sales.insert(sale.id, sale.clone());
    Ok(sale)
  }

  async fn insert_user(&self, user: User) -> Result<User> {
    let mut tables = self.tables.write();
    if tables.users.values().any(|u| u.email == user.email) {
      return Err(AppError::Validation("An account with this email already exists.".to_string()));
    }
    tables.users.insert(user.id, user.clone());
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.tables.read().users.get(&id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    Ok(self.tables.read().users.values().find(|u| u.email == email).cloned())
  }

  async fn bump_token_version(&self, id: Uuid) -> Result<i32> {
    let mut tables = self.tables.write();
    let user = tables.user_mut(id)?;
    user.token_version += 1;
    Ok(user.token_version)
  }

  async fn set_reset_token(&self, id: Uuid, token: &str, expires: DateTime<Utc>) -> Result<()> {
    let mut tables = self.tables.write();
    let user = tables.user_mut(id)?;
    user.reset_token = Some(token.to_string());
    user.reset_expires = Some(expires);
    Ok(())
  }

  async fn find_user_by_reset_token(&self, token: &str, now: DateTime<Utc>) -> Result<Option<User>> {
    Ok(
      self
        .tables
        .read()
        .users
        .values()
        .find(|u| u.reset_token.as_deref() == Some(token) && u.reset_expires.map_or(false, |exp| exp > now))
        .cloned(),
    )
  }

  async fn reset_password(&self, id: Uuid, password_hash: &str, now: DateTime<Utc>) -> Result<User> {
    let mut tables = self.tables.write();
    let user = tables.user_mut(id)?;
    user.password_hash = password_hash.to_string();
    user.reset_token = None;
    user.reset_expires = None;
    user.token_version += 1;
    user.updated_at = now;
    Ok(user.clone())
  }
}
