// app/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use stockflow::{FlowData, FlowOutcome};
use tracing::{info, instrument, warn};

use super::expect_completed;
use crate::errors::AppError;
use crate::pipelines::contexts::{ForgotPasswordCtxData, ResetPasswordCtxData, SigninCtxData, SignupCtxData};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct RegisterRequestPayload {
  pub name: String,
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct ForgotPasswordPayload {
  pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordPayload {
  pub token: String,
  #[serde(alias = "password")]
  pub new_password: String,
}

#[instrument(name = "handler::register", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let req_payload = req_payload.into_inner();
  let signup_ctx = FlowData::new(SignupCtxData {
    app_state: app_state.get_ref().clone(),
    name: req_payload.name,
    email: req_payload.email,
    password: req_payload.password,
    created_user: None,
    token: None,
  });

  match app_state.flows.run(signup_ctx.clone()).await {
    Ok(FlowOutcome::Completed) => {
      let guard = signup_ctx.read();
      let user = guard
        .created_user
        .clone()
        .ok_or_else(|| AppError::Internal("Signup completed without creating a user.".to_string()))?;
      let token = guard
        .token
        .clone()
        .ok_or_else(|| AppError::Internal("Signup completed without a session token.".to_string()))?;
      info!(user_id = %user.id, "Signup successful.");
      Ok(HttpResponse::Created().json(json!({ "token": token, "user": user })))
    }
    Ok(FlowOutcome::Stopped) => Err(AppError::Internal(
      "Signup process was halted by an internal step.".to_string(),
    )),
    Err(app_err) => {
      warn!("Signup pipeline failed: {}", app_err);
      Err(app_err)
    }
  }
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let req_payload = req_payload.into_inner();
  let signin_ctx = FlowData::new(SigninCtxData {
    app_state: app_state.get_ref().clone(),
    email: req_payload.email,
    password: req_payload.password,
    user: None,
    token: None,
  });

  let outcome = app_state.flows.run(signin_ctx.clone()).await?;
  expect_completed(outcome, "Signin")?;

  let guard = signin_ctx.read();
  let (user, token) = match (guard.user.clone(), guard.token.clone()) {
    (Some(user), Some(token)) => (user, token),
    _ => return Err(AppError::Auth("Signin completed without a session token.".to_string())),
  };
  info!(user_id = %user.id, "Signin successful.");
  Ok(HttpResponse::Ok().json(json!({ "token": token, "user": user })))
}

#[instrument(name = "handler::logout", skip_all, fields(user_id = %auth_user.0.id))]
pub async fn logout_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let version = app_state.store.bump_token_version(auth_user.0.id).await?;
  info!(token_version = version, "Logged out; issued tokens revoked.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Logged out successfully" })))
}

#[instrument(name = "handler::me", skip_all)]
pub async fn me_handler(auth_user: AuthenticatedUser) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "user": auth_user.0 }))
}

#[instrument(name = "handler::forgot_password", skip_all)]
pub async fn forgot_password_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ForgotPasswordPayload>,
) -> Result<HttpResponse, AppError> {
  let forgot_ctx = FlowData::new(ForgotPasswordCtxData {
    app_state: app_state.get_ref().clone(),
    email: req_payload.into_inner().email,
    user: None,
    reset_token: None,
    email_sent: false,
  });

  let outcome = app_state.flows.run(forgot_ctx.clone()).await?;
  expect_completed(outcome, "Forgot-password")?;

  let email_sent = forgot_ctx.read().email_sent;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "emailSent": email_sent,
    "message": "If the address is deliverable, a password reset link has been sent.",
  })))
}

#[instrument(name = "handler::reset_password", skip_all)]
pub async fn reset_password_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ResetPasswordPayload>,
) -> Result<HttpResponse, AppError> {
  let req_payload = req_payload.into_inner();
  let reset_ctx = FlowData::new(ResetPasswordCtxData {
    app_state: app_state.get_ref().clone(),
    token: req_payload.token,
    new_password: req_payload.new_password,
    user: None,
  });

  let outcome = app_state.flows.run(reset_ctx).await?;
  expect_completed(outcome, "Reset-password")?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Password has been reset successfully" })))
}
