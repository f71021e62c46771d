// app/src/store/mod.rs

//! Persistence boundary. Workflows only see [`InventoryStore`]; the backend
//! is picked at startup.

use crate::errors::Result;
use crate::models::{Order, Product, ProductUpdate, Sale, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait InventoryStore: Send + Sync {
  // --- Products ---
  async fn insert_product(&self, product: Product) -> Result<Product>;
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;
  /// Products among `ids` that exist; unknown ids are simply absent.
  async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
  /// Sorted by name. Inactive products only when `include_inactive`.
  async fn list_products(&self, include_inactive: bool) -> Result<Vec<Product>>;
  async fn update_product(&self, id: Uuid, update: &ProductUpdate, now: DateTime<Utc>) -> Result<Product>;
  async fn restock_product(&self, id: Uuid, amount: i32, now: DateTime<Utc>) -> Result<Product>;

  // --- Orders ---
  async fn insert_order(&self, order: Order) -> Result<Order>;
  async fn get_order(&self, id: Uuid) -> Result<Option<Order>>;
  /// Newest first; restricted to one owner when `user_id` is given.
  async fn list_orders(&self, user_id: Option<Uuid>) -> Result<Vec<Order>>;
  /// Pending → Cancelled. Any other current state is `InvalidState`.
  async fn cancel_order(&self, id: Uuid, now: DateTime<Utc>) -> Result<Order>;
  /// Sales produced by the order keep their lines and lose the reference.
  async fn delete_order(&self, id: Uuid) -> Result<()>;

  // --- Sales ---
  /// Newest first.
  async fn list_sales(&self) -> Result<Vec<Sale>>;
  async fn get_sale(&self, id: Uuid) -> Result<Option<Sale>>;

  // --- Atomic multi-record writes ---
  /// Re-validates the order state and every stock level, then records the
  /// sale, decrements stock and marks the order Processed. All or nothing.
  async fn commit_fulfillment(&self, order_id: Uuid, sold_at: DateTime<Utc>) -> Result<(Order, Sale)>;
  /// Re-validates stock, then records the sale and decrements stock. All or nothing.
  async fn commit_sale(&self, sale: Sale) -> Result<Sale>;

  // --- Users ---
  /// Duplicate email is a `Validation` error.
  async fn insert_user(&self, user: User) -> Result<User>;
  async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
  /// Returns the new token version.
  async fn bump_token_version(&self, id: Uuid) -> Result<i32>;
  async fn set_reset_token(&self, id: Uuid, token: &str, expires: DateTime<Utc>) -> Result<()>;
  /// Only a token whose expiry is after `now` matches.
  async fn find_user_by_reset_token(&self, token: &str, now: DateTime<Utc>) -> Result<Option<User>>;
  /// Sets the hash, clears the reset token and bumps the token version.
  async fn reset_password(&self, id: Uuid, password_hash: &str, now: DateTime<Utc>) -> Result<User>;
}
