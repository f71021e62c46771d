// app/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewProduct, ProductUpdate};
use crate::services::dashboard::is_low_stock;
use crate::state::AppState;
use crate::web::auth::{AdminUser, AuthenticatedUser};

#[derive(Deserialize, Debug)]
pub struct RestockPayload {
  pub amount: i32,
}

#[instrument(name = "handler::list_active_products", skip_all)]
pub async fn list_active_products_handler(
  app_state: web::Data<AppState>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let products = app_state.store.list_products(false).await?;
  info!(count = products.len(), "Fetched active products.");
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::list_all_products", skip_all)]
pub async fn list_all_products_handler(
  app_state: web::Data<AppState>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let products = app_state.store.list_products(true).await?;
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::list_low_stock", skip_all)]
pub async fn list_low_stock_handler(
  app_state: web::Data<AppState>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let threshold = app_state.config.low_stock_threshold;
  let products: Vec<_> = app_state
    .store
    .list_products(false)
    .await?
    .into_iter()
    .filter(|p| is_low_stock(p, threshold))
    .collect();
  Ok(HttpResponse::Ok().json(json!({ "threshold": threshold, "products": products })))
}

#[instrument(name = "handler::get_product", skip(app_state, _auth_user), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  match app_state.store.get_product(product_id).await? {
    Some(product) => Ok(HttpResponse::Ok().json(json!({ "product": product }))),
    None => {
      warn!("Product with ID {} not found.", product_id);
      Err(AppError::NotFound(format!("Product {} not found.", product_id)))
    }
  }
}

#[instrument(name = "handler::create_product", skip_all, fields(admin_id = %admin.0.id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req_payload: web::Json<NewProduct>,
) -> Result<HttpResponse, AppError> {
  let product = req_payload.into_inner().into_product(Utc::now())?;
  let created = app_state.store.insert_product(product).await?;
  info!(product_id = %created.id, sku = %created.sku, "Product created.");
  Ok(HttpResponse::Created().json(json!({ "product": created })))
}

#[instrument(name = "handler::update_product", skip(app_state, admin, req_payload), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<ProductUpdate>,
) -> Result<HttpResponse, AppError> {
  let updated = app_state
    .store
    .update_product(path.into_inner(), &req_payload, Utc::now())
    .await?;
  info!(admin_id = %admin.0.id, "Product updated.");
  Ok(HttpResponse::Ok().json(json!({ "product": updated })))
}

#[instrument(name = "handler::restock_product", skip(app_state, _admin, req_payload), fields(product_id = %path.as_ref()))]
pub async fn restock_product_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<RestockPayload>,
) -> Result<HttpResponse, AppError> {
  if req_payload.amount <= 0 {
    return Err(AppError::Validation("Restock amount must be greater than zero.".to_string()));
  }
  let restocked = app_state
    .store
    .restock_product(path.into_inner(), req_payload.amount, Utc::now())
    .await?;
  info!(quantity = restocked.quantity, "Product restocked.");
  Ok(HttpResponse::Ok().json(json!({ "product": restocked })))
}

#[instrument(name = "handler::deactivate_product", skip(app_state, _admin), fields(product_id = %path.as_ref()))]
pub async fn deactivate_product_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let deactivate = ProductUpdate {
    active: Some(false),
    ..Default::default()
  };
  let product = app_state
    .store
    .update_product(path.into_inner(), &deactivate, Utc::now())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Product deactivated.", "product": product })))
}
