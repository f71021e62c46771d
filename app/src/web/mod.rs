// app/src/web/mod.rs

pub mod auth;
pub mod handlers;
pub mod routes;

pub use routes::configure_app_routes;

use crate::errors::AppError;
use actix_web::web::{JsonConfig, PathConfig};

/// Malformed JSON bodies surface as 400 with the usual `{"error": ...}` shape.
pub fn json_config() -> JsonConfig {
  JsonConfig::default().error_handler(|err, _req| AppError::Validation(format!("Invalid JSON body: {}", err)).into())
}

/// Unparseable path ids (`/api/orders/not-a-uuid`) are 400s, not actix's
/// plain-text 404.
pub fn path_config() -> PathConfig {
  PathConfig::default().error_handler(|err, _req| AppError::Validation(format!("Invalid path parameter: {}", err)).into())
}
