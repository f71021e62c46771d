// app/src/store/postgres.rs

use super::InventoryStore;
use crate::errors::{AppError, Result};
use crate::models::{LineItem, Order, OrderStatus, Product, ProductUpdate, Sale, User};
use crate::services::inventory::{aggregate_demand, find_shortfalls, index_by_id, restocked_quantity, sale_total_cents};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, sku, name, category, price_cents, quantity, active, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, user_id, customer_name, contact_info, lines, status, created_at, updated_at";
const SALE_COLUMNS: &str = "id, order_id, customer_name, lines, total_cents, sold_at";
const USER_COLUMNS: &str =
  "id, name, email, password_hash, role, token_version, reset_token, reset_expires, created_at, updated_at";

#[derive(FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  customer_name: String,
  contact_info: Option<String>,
  lines: Json<Vec<LineItem>>,
  status: OrderStatus,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
  fn from(row: OrderRow) -> Self {
    Order {
      id: row.id,
      user_id: row.user_id,
      customer_name: row.customer_name,
      contact_info: row.contact_info,
      lines: row.lines.0,
      status: row.status,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(FromRow)]
struct SaleRow {
  id: Uuid,
  order_id: Option<Uuid>,
  customer_name: Option<String>,
  lines: Json<Vec<LineItem>>,
  total_cents: i64,
  sold_at: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
  fn from(row: SaleRow) -> Self {
    Sale {
      id: row.id,
      order_id: row.order_id,
      customer_name: row.customer_name,
      lines: row.lines.0,
      total_cents: row.total_cents,
      sold_at: row.sold_at,
    }
  }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
  matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Postgres-backed store. Multi-record writes run in one transaction with
/// the touched rows locked `FOR UPDATE`; dropping the transaction on an
/// early return rolls it back.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn migrate(&self) -> Result<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    Ok(())
  }

  /// Locks the products in id order so concurrent writers cannot deadlock.
  async fn lock_products(conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
      "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE"
    ))
    .bind(ids)
    .fetch_all(&mut *conn)
    .await?;
    Ok(products)
  }

  /// Re-checks `demand` against locked rows and decrements stock.
  async fn take_stock(conn: &mut PgConnection, demand: &[(Uuid, i64)], now: DateTime<Utc>) -> Result<()> {
    let ids: Vec<Uuid> = demand.iter().map(|(id, _)| *id).collect();
    let locked = index_by_id(Self::lock_products(&mut *conn, &ids).await?);
    let shortfalls = find_shortfalls(demand, &locked)?;
    if !shortfalls.is_empty() {
      return Err(AppError::InsufficientStock(shortfalls));
    }

    for (product_id, requested) in demand {
      sqlx::query("UPDATE products SET quantity = quantity - $2, updated_at = $3 WHERE id = $1")
        .bind(product_id)
        .bind(requested)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
  }

  async fn insert_sale(conn: &mut PgConnection, sale: &Sale) -> Result<()> {
    sqlx::query(
      "INSERT INTO sales (id, order_id, customer_name, lines, total_cents, sold_at) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(sale.id)
    .bind(sale.order_id)
    .bind(&sale.customer_name)
    .bind(Json(&sale.lines))
    .bind(sale.total_cents)
    .bind(sale.sold_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
  }

  async fn fetch_user_by(&self, clause: &str, value: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}"))
      .bind(value)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }
}

#[async_trait]
impl InventoryStore for PgStore {
  #[instrument(name = "PgStore::insert_product", skip_all, fields(sku = %product.sku))]
  async fn insert_product(&self, product: Product) -> Result<Product> {
    let inserted = sqlx::query_as::<_, Product>(&format!(
      "INSERT INTO products ({PRODUCT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(product.id)
    .bind(&product.sku)
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.price_cents)
    .bind(product.quantity)
    .bind(product.active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| {
      if is_unique_violation(&e) {
        AppError::Internal(format!("SKU {} already in use.", product.sku))
      } else {
        AppError::Sqlx(e)
      }
    })?;
    Ok(inserted)
  }

  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"))
      .bind(ids)
      .fetch_all(&self.pool)
      .await?;
    Ok(products)
  }

  async fn list_products(&self, include_inactive: bool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
      "SELECT {PRODUCT_COLUMNS} FROM products WHERE active OR $1 ORDER BY name ASC"
    ))
    .bind(include_inactive)
    .fetch_all(&self.pool)
    .await?;
    Ok(products)
  }

  #[instrument(name = "PgStore::update_product", skip(self, update), err(Display))]
  async fn update_product(&self, id: Uuid, update: &ProductUpdate, now: DateTime<Utc>) -> Result<Product> {
    let mut tx = self.pool.begin().await?;
    let mut product = sqlx::query_as::<_, Product>(&format!(
      "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", id)))?;

    update.apply_to(&mut product, now)?;

    let saved = sqlx::query_as::<_, Product>(&format!(
      "UPDATE products SET name = $2, category = $3, price_cents = $4, quantity = $5, active = $6, updated_at = $7 \
       WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.price_cents)
    .bind(product.quantity)
    .bind(product.active)
    .bind(product.updated_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(saved)
  }

  #[instrument(name = "PgStore::restock_product", skip(self), err(Display))]
  async fn restock_product(&self, id: Uuid, amount: i32, now: DateTime<Utc>) -> Result<Product> {
    let mut tx = self.pool.begin().await?;
    let current: i32 = sqlx::query_scalar("SELECT quantity FROM products WHERE id = $1 FOR UPDATE")
      .bind(id)
      .fetch_optional(&mut *tx)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", id)))?;
    let quantity = restocked_quantity(current, amount)?;

    let product = sqlx::query_as::<_, Product>(&format!(
      "UPDATE products SET quantity = $2, updated_at = $3 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(id)
    .bind(quantity)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(product)
  }

  async fn insert_order(&self, order: Order) -> Result<Order> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
      "INSERT INTO orders ({ORDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.customer_name)
    .bind(&order.contact_info)
    .bind(Json(&order.lines))
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(row.into())
  }

  async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Order::from))
  }

  async fn list_orders(&self, user_id: Option<Uuid>) -> Result<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
      "SELECT {ORDER_COLUMNS} FROM orders WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(Order::from).collect())
  }

  #[instrument(name = "PgStore::cancel_order", skip(self), err(Display))]
  async fn cancel_order(&self, id: Uuid, now: DateTime<Utc>) -> Result<Order> {
    let mut tx = self.pool.begin().await?;
    let current: OrderStatus = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
      .bind(id)
      .fetch_optional(&mut *tx)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", id)))?;
    if current != OrderStatus::Pending {
      return Err(AppError::InvalidState { current });
    }

    let row = sqlx::query_as::<_, OrderRow>(&format!(
      "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(id)
    .bind(OrderStatus::Cancelled)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row.into())
  }

  async fn delete_order(&self, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(AppError::NotFound(format!("Order {} not found.", id)));
    }
    Ok(())
  }

  async fn list_sales(&self) -> Result<Vec<Sale>> {
    let rows = sqlx::query_as::<_, SaleRow>(&format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY sold_at DESC"))
      .fetch_all(&self.pool)
      .await?;
    Ok(rows.into_iter().map(Sale::from).collect())
  }

  async fn get_sale(&self, id: Uuid) -> Result<Option<Sale>> {
    let row = sqlx::query_as::<_, SaleRow>(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = $1"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Sale::from))
  }

  #[instrument(name = "PgStore::commit_fulfillment", skip(self), err(Display))]
  async fn commit_fulfillment(&self, order_id: Uuid, sold_at: DateTime<Utc>) -> Result<(Order, Sale)> {
    let mut tx = self.pool.begin().await?;

    let order: Order = sqlx::query_as::<_, OrderRow>(&format!(
      "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
    ))
    .bind(order_id)
    .fetch_optional(&mut *tx)
    .await?
    .map(Order::from)
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_id)))?;
    if order.status != OrderStatus::Pending {
      return Err(AppError::InvalidState { current: order.status });
    }

    let total_cents = sale_total_cents(&order.lines)?;
    let demand = aggregate_demand(order.lines.iter().map(|l| (l.product_id, l.quantity)));
    Self::take_stock(&mut *tx, &demand, sold_at).await?;

    let sale = Sale {
      id: Uuid::new_v4(),
      order_id: Some(order.id),
      customer_name: Some(order.customer_name.clone()),
      lines: order.lines.clone(),
      total_cents,
      sold_at,
    };
    Self::insert_sale(&mut *tx, &sale).await?;

    let processed: Order = sqlx::query_as::<_, OrderRow>(&format!(
      "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order_id)
    .bind(OrderStatus::Processed)
    .bind(sold_at)
    .fetch_one(&mut *tx)
    .await?
    .into();

    tx.commit().await?;
    debug!(order_id = %order_id, sale_id = %sale.id, "Fulfillment committed.");
    Ok((processed, sale))
  }

  #[instrument(name = "PgStore::commit_sale", skip_all, fields(sale_id = %sale.id), err(Display))]
  async fn commit_sale(&self, sale: Sale) -> Result<Sale> {
    let mut tx = self.pool.begin().await?;
    let demand = aggregate_demand(sale.lines.iter().map(|l| (l.product_id, l.quantity)));
    Self::take_stock(&mut *tx, &demand, sale.sold_at).await?;
    Self::insert_sale(&mut *tx, &sale).await?;
    tx.commit().await?;
    Ok(sale)
  }

  async fn insert_user(&self, user: User) -> Result<User> {
    let inserted = sqlx::query_as::<_, User>(&format!(
      "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {USER_COLUMNS}"
    ))
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role)
    .bind(user.token_version)
    .bind(&user.reset_token)
    .bind(user.reset_expires)
    .bind(user.created_at)
    .bind(user.updated_at)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| {
      if is_unique_violation(&e) {
        AppError::Validation("An account with this email already exists.".to_string())
      } else {
        AppError::Sqlx(e)
      }
    })?;
    Ok(inserted)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    self.fetch_user_by("email = $1", email).await
  }

  async fn bump_token_version(&self, id: Uuid) -> Result<i32> {
    sqlx::query_scalar("UPDATE users SET token_version = token_version + 1, updated_at = now() WHERE id = $1 RETURNING token_version")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("User {} not found.", id)))
  }

  async fn set_reset_token(&self, id: Uuid, token: &str, expires: DateTime<Utc>) -> Result<()> {
    let result = sqlx::query("UPDATE users SET reset_token = $2, reset_expires = $3 WHERE id = $1")
      .bind(id)
      .bind(token)
      .bind(expires)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(AppError::NotFound(format!("User {} not found.", id)));
    }
    Ok(())
  }

  async fn find_user_by_reset_token(&self, token: &str, now: DateTime<Utc>) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
      "SELECT {USER_COLUMNS} FROM users WHERE reset_token = $1 AND reset_expires > $2"
    ))
    .bind(token)
    .bind(now)
    .fetch_optional(&self.pool)
    .await?;
    Ok(user)
  }

  async fn reset_password(&self, id: Uuid, password_hash: &str, now: DateTime<Utc>) -> Result<User> {
    sqlx::query_as::<_, User>(&format!(
      "UPDATE users SET password_hash = $2, reset_token = NULL, reset_expires = NULL, \
       token_version = token_version + 1, updated_at = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(password_hash)
    .bind(now)
    .fetch_optional(&self.pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found.", id)))
  }
}
