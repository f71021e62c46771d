// app/src/web/handlers/sale_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use stockflow::FlowData;
use tracing::instrument;
use uuid::Uuid;

use super::expect_completed;
use crate::errors::AppError;
use crate::models::NewSale;
use crate::pipelines::contexts::DirectSaleCtxData;
use crate::state::AppState;
use crate::web::auth::{AdminUser, AuthenticatedUser};

#[instrument(name = "handler::create_sale", skip_all, fields(admin_id = %admin.0.id))]
pub async fn create_sale_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req_payload: web::Json<NewSale>,
) -> Result<HttpResponse, AppError> {
  let sale_ctx = FlowData::new(DirectSaleCtxData::new(
    app_state.get_ref().clone(),
    admin.0,
    req_payload.into_inner(),
  ));

  let outcome = app_state.flows.run(sale_ctx.clone()).await?;
  expect_completed(outcome, "Direct sale")?;

  let sale = sale_ctx
    .read()
    .sale
    .clone()
    .ok_or_else(|| AppError::Internal("Direct sale finished without a sale.".to_string()))?;
  Ok(HttpResponse::Created().json(json!({ "sale": sale })))
}

#[instrument(name = "handler::list_sales", skip_all)]
pub async fn list_sales_handler(
  app_state: web::Data<AppState>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let sales = app_state.store.list_sales().await?;
  Ok(HttpResponse::Ok().json(json!({ "sales": sales })))
}

#[instrument(name = "handler::get_sale", skip(app_state, _auth_user), fields(sale_id = %path.as_ref()))]
pub async fn get_sale_handler(
  app_state: web::Data<AppState>,
  _auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let sale_id = path.into_inner();
  let sale = app_state
    .store
    .get_sale(sale_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Sale {} not found.", sale_id)))?;
  Ok(HttpResponse::Ok().json(json!({ "sale": sale })))
}
