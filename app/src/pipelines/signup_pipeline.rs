// app/src/pipelines/signup_pipeline.rs

use crate::errors::AppError;
use crate::models::{NewUser, Role};
use crate::pipelines::contexts::SignupCtxData;
use crate::services::auth_service;
use chrono::Utc;
use stockflow::{FlowData, FlowRegistry, StepControl, Workflow};
use tracing::{event, info, warn, Level};

/// Registers the user sign-up pipeline. New accounts always get the `user`
/// role; admins come from seeding.
pub fn register_signup_pipeline(flows: &FlowRegistry<AppError>) {
  let mut signup_p = Workflow::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false, None),
    ("check_existing_user_signup", false, None),
    ("create_user", false, None),
    ("issue_signup_token", false, None),
  ]);

  signup_p.on_root("validate_signup_input", |ctx_data: FlowData<SignupCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      guard.name = guard.name.trim().to_string();
      guard.email = auth_service::normalize_email(&guard.email);

      event!(Level::DEBUG, email = %guard.email, "Validating signup input.");
      if guard.name.is_empty() {
        return Err(AppError::Validation("Name is required.".to_string()));
      }
      if guard.email.is_empty() || !guard.email.contains('@') {
        warn!("Invalid email format provided for signup.");
        return Err(AppError::Validation("Valid email is required.".to_string()));
      }
      auth_service::check_password_strength(&guard.password)?;
      Ok(StepControl::Continue)
    })
  });

  signup_p.on_root("check_existing_user_signup", |ctx_data: FlowData<SignupCtxData>| {
    Box::pin(async move {
      let (email_val, store) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.app_state.store.clone())
      };

      if store.find_user_by_email(&email_val).await?.is_some() {
        warn!("Attempt to signup with existing email: {}", email_val);
        return Err(AppError::Validation("An account with this email already exists.".to_string()));
      }
      Ok(StepControl::Continue)
    })
  });

  signup_p.on_root("create_user", |ctx_data: FlowData<SignupCtxData>| {
    Box::pin(async move {
      let (name_val, email_val, password_val, store) = {
        let guard = ctx_data.read();
        (
          guard.name.clone(),
          guard.email.clone(),
          guard.password.clone(),
          guard.app_state.store.clone(),
        )
      };

      let password_hash = auth_service::hash_password(&password_val)?;
      let new_user = NewUser {
        name: name_val,
        email: email_val,
        password_hash,
        role: Role::User,
      }
      .into_user(Utc::now());

      let created = store.insert_user(new_user).await?;
      info!(user_id = %created.id, email = %created.email, "User created.");
      ctx_data.write().created_user = Some(created);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  signup_p.on_root("issue_signup_token", |ctx_data: FlowData<SignupCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let token = match guard.created_user.as_ref() {
        Some(user) => auth_service::issue_token(
          user,
          &guard.app_state.config.jwt_secret,
          guard.app_state.config.jwt_ttl_hours,
          Utc::now(),
        )?,
        None => return Err(AppError::Internal("Signup completed without creating a user.".to_string())),
      };
      guard.token = Some(token);
      Ok(StepControl::Continue)
    })
  });

  flows.register(signup_p);
  info!("Sign-up pipeline registered.");
}
