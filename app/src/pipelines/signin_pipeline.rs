// app/src/pipelines/signin_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use chrono::Utc;
use stockflow::{FlowData, FlowRegistry, StepControl, Workflow};
use tracing::{event, info, warn, Level};

const BAD_CREDENTIALS: &str = "Invalid email or password.";

pub fn register_signin_pipeline(flows: &FlowRegistry<AppError>) {
  let mut signin_p = Workflow::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_user_by_email", false, None),
    ("verify_user_password", false, None),
    ("issue_session_token", false, None),
  ]);

  signin_p.on_root("validate_signin_input", |ctx_data: FlowData<SigninCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      guard.email = auth_service::normalize_email(&guard.email);
      if guard.email.is_empty() || !guard.email.contains('@') {
        return Err(AppError::Validation("Valid email is required.".to_string()));
      }
      if guard.password.is_empty() {
        return Err(AppError::Validation("Password is required.".to_string()));
      }
      Ok(StepControl::Continue)
    })
  });

  signin_p.on_root("fetch_user_by_email", |ctx_data: FlowData<SigninCtxData>| {
    Box::pin(async move {
      let (email_val, store) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.app_state.store.clone())
      };

      event!(Level::DEBUG, email = %email_val, "Fetching user by email for signin.");
      match store.find_user_by_email(&email_val).await? {
        Some(user) => {
          event!(Level::INFO, user_id = %user.id, "User found for signin.");
          ctx_data.write().user = Some(user);
          Ok(StepControl::Continue)
        }
        None => {
          warn!("User not found for email during signin: {}", email_val);
          Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
        }
      }
    })
  });

  signin_p.on_root("verify_user_password", |ctx_data: FlowData<SigninCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let user = guard
        .user
        .as_ref()
        .ok_or_else(|| AppError::Internal("User missing from signin context.".to_string()))?;

      if auth_service::verify_password(&user.password_hash, &guard.password)? {
        Ok(StepControl::Continue)
      } else {
        warn!(user_id = %user.id, "Password mismatch on signin.");
        Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
      }
    })
  });

  signin_p.on_root("issue_session_token", |ctx_data: FlowData<SigninCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let token = match guard.user.as_ref() {
        Some(user) => auth_service::issue_token(
          user,
          &guard.app_state.config.jwt_secret,
          guard.app_state.config.jwt_ttl_hours,
          Utc::now(),
        )?,
        None => return Err(AppError::Internal("User missing from signin context.".to_string())),
      };
      guard.token = Some(token);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  flows.register(signin_p);
  info!("Sign-in pipeline registered.");
}
