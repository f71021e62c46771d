// app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use stockflow::{FlowData, FlowOutcome};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::expect_completed;
use crate::errors::AppError;
use crate::models::{NewOrder, OrderStatus};
use crate::pipelines::contexts::{FulfillOrderCtxData, PlaceOrderCtxData};
use crate::state::AppState;
use crate::web::auth::{AdminUser, AuthenticatedUser};

#[derive(Deserialize, Debug)]
pub struct StatusChangePayload {
  pub status: OrderStatus,
}

#[instrument(name = "handler::place_order", skip_all, fields(user_id = %auth_user.0.id))]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<NewOrder>,
) -> Result<HttpResponse, AppError> {
  let order_ctx = FlowData::new(PlaceOrderCtxData::new(
    app_state.get_ref().clone(),
    auth_user.0,
    req_payload.into_inner(),
  ));

  let outcome = app_state.flows.run(order_ctx.clone()).await?;
  expect_completed(outcome, "Order placement")?;

  let order = order_ctx
    .read()
    .created_order
    .clone()
    .ok_or_else(|| AppError::Internal("Order placement finished without an order.".to_string()))?;
  Ok(HttpResponse::Created().json(json!({ "order": order })))
}

#[instrument(name = "handler::list_all_orders", skip_all)]
pub async fn list_all_orders_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.store.list_orders(None).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::list_my_orders", skip_all, fields(user_id = %auth_user.0.id))]
pub async fn list_my_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.store.list_orders(Some(auth_user.0.id)).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = app_state
    .store
    .get_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_id)))?;

  let viewer = &auth_user.0;
  if order.user_id != viewer.id && !viewer.is_admin() {
    warn!(viewer_id = %viewer.id, "Order viewed by someone other than its owner.");
    return Err(AppError::Forbidden("Not authorized to view this order".to_string()));
  }
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

/// Only cancellation is accepted here; Processed is reached through fulfillment.
#[instrument(name = "handler::update_order_status", skip(app_state, admin, req_payload), fields(order_id = %path.as_ref()))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<StatusChangePayload>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  match req_payload.status {
    OrderStatus::Cancelled => {
      let order = app_state.store.cancel_order(order_id, Utc::now()).await?;
      info!(admin_id = %admin.0.id, "Order cancelled.");
      Ok(HttpResponse::Ok().json(json!({ "order": order })))
    }
    OrderStatus::Processed => Err(AppError::Validation(
      "Orders become Processed only through fulfillment.".to_string(),
    )),
    OrderStatus::Pending => Err(AppError::Validation(
      "An order cannot be moved back to Pending.".to_string(),
    )),
  }
}

#[instrument(name = "handler::fulfill_order", skip(app_state, admin), fields(order_id = %path.as_ref(), admin_id = %admin.0.id))]
pub async fn fulfill_order_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let fulfill_ctx = FlowData::new(FulfillOrderCtxData::new(
    app_state.get_ref().clone(),
    admin.0,
    path.into_inner(),
  ));

  match app_state.flows.run(fulfill_ctx.clone()).await {
    Ok(FlowOutcome::Completed) => {
      let result = fulfill_ctx.snapshot();
      match (result.order, result.sale) {
        (Some(order), Some(sale)) => Ok(HttpResponse::Ok().json(json!({
          "message": "Order processed to sale successfully",
          "order": order,
          "sale": sale,
          "lowStock": result.low_stock,
        }))),
        _ => Err(AppError::Internal("Fulfillment finished without a sale.".to_string())),
      }
    }
    Ok(FlowOutcome::Stopped) => Err(AppError::Internal(
      "Fulfillment was halted by an internal step.".to_string(),
    )),
    Err(app_err) => {
      warn!("Fulfillment failed: {}", app_err);
      Err(app_err)
    }
  }
}

#[instrument(name = "handler::delete_order", skip(app_state, admin), fields(order_id = %path.as_ref()))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  app_state.store.delete_order(order_id).await?;
  info!(admin_id = %admin.0.id, "Order deleted.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Order removed", "orderId": order_id })))
}
