// app/src/pipelines/password_reset_pipeline.rs

//! Forgot-password (issue a reset token and mail a link) and
//! reset-password (consume the token, set a new password, revoke sessions).

use crate::errors::AppError;
use crate::pipelines::contexts::{ForgotPasswordCtxData, ResetPasswordCtxData};
use crate::services::{auth_service, mailer};
use chrono::Utc;
use stockflow::{FlowData, FlowRegistry, StepControl, Workflow};
use tracing::{info, warn};

pub fn register_forgot_password_pipeline(flows: &FlowRegistry<AppError>) {
  let mut forgot_p = Workflow::<ForgotPasswordCtxData, AppError>::new(&[
    ("find_account", false, None),
    ("store_reset_token", false, None),
    ("send_reset_email", true, None),
  ]);

  forgot_p.on_root("find_account", |ctx_data: FlowData<ForgotPasswordCtxData>| {
    Box::pin(async move {
      let (email_val, store) = {
        let mut guard = ctx_data.write();
        guard.email = auth_service::normalize_email(&guard.email);
        (guard.email.clone(), guard.app_state.store.clone())
      };
      if email_val.is_empty() {
        return Err(AppError::Validation("Email is required.".to_string()));
      }

      let user = store
        .find_user_by_email(&email_val)
        .await?
        .ok_or_else(|| AppError::NotFound("No account with that email.".to_string()))?;
      ctx_data.write().user = Some(user);
      Ok(StepControl::Continue)
    })
  });

  forgot_p.on_root("store_reset_token", |ctx_data: FlowData<ForgotPasswordCtxData>| {
    Box::pin(async move {
      let (user_id, ttl_minutes, store) = {
        let guard = ctx_data.read();
        let user_id = guard
          .user
          .as_ref()
          .map(|u| u.id)
          .ok_or_else(|| AppError::Internal("Account missing from reset context.".to_string()))?;
        (user_id, guard.app_state.config.reset_token_ttl_minutes, guard.app_state.store.clone())
      };

      let token = auth_service::generate_reset_token();
      let expires = auth_service::reset_token_expiry(Utc::now(), ttl_minutes)?;
      store.set_reset_token(user_id, &token, expires).await?;
      info!(%user_id, %expires, "Password reset token issued.");
      ctx_data.write().reset_token = Some(token);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  forgot_p.on_root("send_reset_email", |ctx_data: FlowData<ForgotPasswordCtxData>| {
    Box::pin(async move {
      let (recipient, token, config) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.reset_token.clone(), guard.app_state.config.clone())
      };
      let Some(token) = token else {
        warn!("No reset token in context; skipping reset email.");
        return Ok::<_, AppError>(StepControl::Continue);
      };

      let link = mailer::password_reset_link(&config.frontend_base_url, &token);
      let body = mailer::password_reset_body(&link, config.reset_token_ttl_minutes);
      match mailer::send_mock_email(&recipient, &config.mail_sender, "Password Reset - Stockroom", &body).await {
        Ok(sent) => {
          info!(message_id = %sent.message_id, "Reset email dispatched.");
          ctx_data.write().email_sent = true;
        }
        Err(e) => warn!(error = %e, "Reset email failed; the token remains valid."),
      }
      Ok(StepControl::Continue)
    })
  });

  flows.register(forgot_p);
  info!("Forgot-password pipeline registered.");
}

pub fn register_reset_password_pipeline(flows: &FlowRegistry<AppError>) {
  let mut reset_p = Workflow::<ResetPasswordCtxData, AppError>::new(&[
    ("validate_new_password", false, None),
    ("find_reset_token_owner", false, None),
    ("store_new_password", false, None),
  ]);

  reset_p.on_root("validate_new_password", |ctx_data: FlowData<ResetPasswordCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      if guard.token.trim().is_empty() {
        return Err(AppError::Validation("Reset token is required.".to_string()));
      }
      auth_service::check_password_strength(&guard.new_password)?;
      Ok(StepControl::Continue)
    })
  });

  reset_p.on_root("find_reset_token_owner", |ctx_data: FlowData<ResetPasswordCtxData>| {
    Box::pin(async move {
      let (token, store) = {
        let guard = ctx_data.read();
        (guard.token.trim().to_string(), guard.app_state.store.clone())
      };
      let user = store
        .find_user_by_reset_token(&token, Utc::now())
        .await?
        .ok_or_else(|| AppError::Validation("Password reset token is invalid or has expired.".to_string()))?;
      ctx_data.write().user = Some(user);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  reset_p.on_root("store_new_password", |ctx_data: FlowData<ResetPasswordCtxData>| {
    Box::pin(async move {
      let (user_id, password, store) = {
        let guard = ctx_data.read();
        let user_id = guard
          .user
          .as_ref()
          .map(|u| u.id)
          .ok_or_else(|| AppError::Internal("Account missing from reset context.".to_string()))?;
        (user_id, guard.new_password.clone(), guard.app_state.store.clone())
      };

      let password_hash = auth_service::hash_password(&password)?;
      let updated = store.reset_password(user_id, &password_hash, Utc::now()).await?;
      info!(%user_id, token_version = updated.token_version, "Password reset; earlier tokens revoked.");
      ctx_data.write().user = Some(updated);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  flows.register(reset_p);
  info!("Reset-password pipeline registered.");
}
