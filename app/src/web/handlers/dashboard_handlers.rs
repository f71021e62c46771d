// app/src/web/handlers/dashboard_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::services::dashboard;
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[instrument(name = "handler::dashboard_summary", skip_all)]
pub async fn summary_handler(
  app_state: web::Data<AppState>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let summary = dashboard::load_summary(app_state.store.as_ref(), app_state.config.low_stock_threshold).await?;
  Ok(HttpResponse::Ok().json(summary))
}
