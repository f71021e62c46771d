// app/tests/common/mod.rs
#![allow(dead_code)]

use chrono::Utc;
use once_cell::sync::Lazy;
use std::sync::Arc;
use stockflow::FlowData;
use stockroom::errors::AppError;
use stockroom::models::{LineRequest, NewOrder, NewProduct, NewUser, Order, Product, ProductUpdate, Role, User};
use stockroom::pipelines::contexts::{FulfillOrderCtxData, PlaceOrderCtxData};
use stockroom::services::auth_service;
use stockroom::store::{InventoryStore, MemoryStore};
use stockroom::{AppConfig, AppState};
use tracing::Level;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "warehouse-42";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn test_config() -> AppConfig {
  AppConfig::from_lookup(|name| match name {
    "STORE_BACKEND" => Some("memory".to_string()),
    "JWT_SECRET" => Some("test-secret".to_string()),
    "LOW_STOCK_THRESHOLD" => Some("10".to_string()),
    _ => None,
  })
  .expect("test config")
}

pub struct TestApp {
  pub state: AppState,
}

impl TestApp {
  pub fn new() -> Self {
    Self::with_store(Arc::new(MemoryStore::new()), test_config())
  }

  pub fn with_store(store: Arc<dyn InventoryStore>, config: AppConfig) -> Self {
    setup_tracing();
    Self {
      state: AppState::build(store, Arc::new(config)),
    }
  }

  pub fn store(&self) -> &dyn InventoryStore {
    self.state.store.as_ref()
  }

  pub async fn create_user(&self, name: &str, role: Role) -> User {
    let user = NewUser {
      name: name.to_string(),
      email: format!("{}@stockroom.test", name.to_lowercase()),
      password_hash: auth_service::hash_password(TEST_PASSWORD).expect("hash"),
      role,
    }
    .into_user(Utc::now());
    self.store().insert_user(user).await.expect("insert user")
  }

  pub async fn admin(&self) -> User {
    self.create_user("Admin", Role::Admin).await
  }

  pub async fn clerk(&self) -> User {
    self.create_user("Clerk", Role::User).await
  }

  pub fn token_for(&self, user: &User) -> String {
    auth_service::issue_token(user, &self.state.config.jwt_secret, 1, Utc::now()).expect("token")
  }

  pub async fn add_product(&self, name: &str, price_cents: i64, quantity: i32) -> Product {
    let product = NewProduct {
      name: name.to_string(),
      category: "General".to_string(),
      price_cents,
      quantity,
    }
    .into_product(Utc::now())
    .expect("valid product");
    self.store().insert_product(product).await.expect("insert product")
  }

  pub async fn set_quantity(&self, product_id: Uuid, quantity: i32) {
    let update = ProductUpdate {
      quantity: Some(quantity),
      ..Default::default()
    };
    self
      .store()
      .update_product(product_id, &update, Utc::now())
      .await
      .expect("quantity update");
  }

  pub async fn quantity_of(&self, product_id: Uuid) -> i32 {
    self
      .store()
      .get_product(product_id)
      .await
      .expect("store")
      .expect("product exists")
      .quantity
  }

  pub async fn try_place_order(&self, actor: &User, lines: &[(Uuid, i32)]) -> Result<Order, AppError> {
    let request = NewOrder {
      customer_name: "Acme Hardware".to_string(),
      contact_info: Some("orders@acme.test".to_string()),
      lines: lines
        .iter()
        .map(|(product_id, quantity)| LineRequest {
          product_id: *product_id,
          quantity: *quantity,
        })
        .collect(),
    };
    let ctx = FlowData::new(PlaceOrderCtxData::new(self.state.clone(), actor.clone(), request));
    self.state.flows.run(ctx.clone()).await?;
    let order = ctx.read().created_order.clone();
    order.ok_or_else(|| AppError::Internal("no order".to_string()))
  }

  pub async fn place_order(&self, actor: &User, lines: &[(Uuid, i32)]) -> Order {
    self.try_place_order(actor, lines).await.expect("order placed")
  }

  pub async fn fulfill(&self, actor: &User, order_id: Uuid) -> Result<FulfillOrderCtxData, AppError> {
    let ctx = FlowData::new(FulfillOrderCtxData::new(self.state.clone(), actor.clone(), order_id));
    self.state.flows.run(ctx.clone()).await?;
    Ok(ctx.snapshot())
  }
}
