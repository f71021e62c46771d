// app/src/web/auth.rs

//! Bearer-token extractors. `AuthenticatedUser` accepts any valid session,
//! `AdminUser` additionally requires the admin role.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::User;
use crate::services::auth_service;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
  let header = header.ok_or_else(|| AppError::Auth("Not authorized, no token".to_string()))?;
  header
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or_else(|| AppError::Auth("Not authorized, no token".to_string()))
}

/// Resolves a token to its user. The user must still exist and the token's
/// version must match the stored one.
pub async fn authenticate(state: &AppState, token: &str) -> Result<User, AppError> {
  let claims = auth_service::decode_token(token, &state.config.jwt_secret)?;
  let user = state
    .store
    .get_user(claims.sub)
    .await?
    .ok_or_else(|| AppError::Auth("User not found".to_string()))?;

  if user.token_version != claims.ver {
    warn!(user_id = %user.id, token_version = claims.ver, current = user.token_version, "Revoked token presented.");
    return Err(AppError::Auth("Session is no longer valid. Please log in again.".to_string()));
  }
  debug!(user_id = %user.id, "Request authenticated.");
  Ok(user)
}

fn extract_user(req: &HttpRequest) -> LocalBoxFuture<'static, Result<User, AppError>> {
  let state = req.app_data::<web::Data<AppState>>().cloned();
  let header = req
    .headers()
    .get(AUTHORIZATION)
    .and_then(|h| h.to_str().ok())
    .map(str::to_owned);

  Box::pin(async move {
    let state = state.ok_or_else(|| AppError::Internal("Application state not configured.".to_string()))?;
    let token = bearer_token(header.as_deref())?;
    authenticate(&state, token).await
  })
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let user = extract_user(req);
    Box::pin(async move { user.await.map(AuthenticatedUser) })
  }
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let user = extract_user(req);
    Box::pin(async move {
      let user = user.await?;
      if !user.is_admin() {
        warn!(user_id = %user.id, "Non-admin attempted an admin route.");
        return Err(AppError::Forbidden("Admin access required".to_string()));
      }
      Ok(AdminUser(user))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bearer_prefix_is_required() {
    assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
    assert!(bearer_token(None).is_err());
    assert!(bearer_token(Some("Basic abc")).is_err());
    assert!(bearer_token(Some("Bearer   ")).is_err());
  }
}
