// app/src/pipelines/contexts.rs

//! Context data for every workflow. Handlers receive these wrapped in
//! `stockflow::FlowData`; the acting user, where there is one, is always an
//! explicit field.

use crate::models::{LineItem, NewOrder, NewSale, Order, Product, Sale, User};
use crate::state::AppState;
use uuid::Uuid;

// --- Accounts ---

#[derive(Clone)]
pub struct SignupCtxData {
  pub app_state: AppState,
  pub name: String,
  pub email: String,
  pub password: String,
  pub created_user: Option<User>,
  pub token: Option<String>,
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub token: Option<String>,
}

#[derive(Clone)]
pub struct ForgotPasswordCtxData {
  pub app_state: AppState,
  pub email: String,
  pub user: Option<User>,
  pub reset_token: Option<String>,
  pub email_sent: bool,
}

#[derive(Clone)]
pub struct ResetPasswordCtxData {
  pub app_state: AppState,
  pub token: String,
  pub new_password: String,
  pub user: Option<User>,
}

// --- Orders and sales ---

#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub app_state: AppState,
  pub actor: User,
  pub request: NewOrder,
  pub lines: Vec<LineItem>,
  pub created_order: Option<Order>,
}

impl PlaceOrderCtxData {
  pub fn new(app_state: AppState, actor: User, request: NewOrder) -> Self {
    Self {
      app_state,
      actor,
      request,
      lines: Vec::new(),
      created_order: None,
    }
  }
}

#[derive(Clone)]
pub struct FulfillOrderCtxData {
  pub app_state: AppState,
  pub actor: User,
  pub order_id: Uuid,
  pub order: Option<Order>,
  pub expected_total_cents: Option<i64>,
  pub sale: Option<Sale>,
  /// Products left below the low-stock threshold by this fulfillment.
  pub low_stock: Vec<Product>,
}

impl std::fmt::Debug for FulfillOrderCtxData {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FulfillOrderCtxData")
      .field("actor", &self.actor.id)
      .field("order_id", &self.order_id)
      .field("order", &self.order)
      .field("expected_total_cents", &self.expected_total_cents)
      .field("sale", &self.sale)
      .field("low_stock", &self.low_stock)
      .finish_non_exhaustive()
  }
}

impl FulfillOrderCtxData {
  pub fn new(app_state: AppState, actor: User, order_id: Uuid) -> Self {
    Self {
      app_state,
      actor,
      order_id,
      order: None,
      expected_total_cents: None,
      sale: None,
      low_stock: Vec::new(),
    }
  }
}

#[derive(Clone)]
pub struct DirectSaleCtxData {
  pub app_state: AppState,
  pub actor: User,
  pub request: NewSale,
  pub lines: Vec<LineItem>,
  pub sale: Option<Sale>,
}

impl DirectSaleCtxData {
  pub fn new(app_state: AppState, actor: User, request: NewSale) -> Self {
    Self {
      app_state,
      actor,
      request,
      lines: Vec::new(),
      sale: None,
    }
  }
}
