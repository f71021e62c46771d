// app/src/services/auth_service.rs

//! Password hashing, access tokens and reset tokens.

use crate::errors::AppError;
use crate::models::{Role, User};
use argon2::{
  password_hash::{rand_core::OsRng as SaltRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hashes a plain-text password with Argon2 and a random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut SaltRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => {
      debug!("Password hashed successfully.");
      Ok(hash.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// `Ok(false)` on mismatch. A malformed stored hash is an internal error.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

pub fn check_password_strength(password: &str) -> Result<(), AppError> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(AppError::Validation(format!(
      "Password must be at least {} characters long.",
      MIN_PASSWORD_LEN
    )));
  }
  Ok(())
}

/// Access-token payload. `ver` must equal the user's current token version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  pub ver: i32,
  pub role: Role,
  pub iat: i64,
  pub exp: i64,
}

#[instrument(name = "auth_service::issue_token", skip(user, secret), fields(user_id = %user.id), err(Display))]
pub fn issue_token(user: &User, secret: &str, ttl_hours: i64, now: DateTime<Utc>) -> Result<String, AppError> {
  let claims = Claims {
    sub: user.id,
    ver: user.token_version,
    role: user.role,
    iat: now.timestamp(),
    exp: offset_from(now, Duration::try_hours(ttl_hours))?.timestamp(),
  };
  encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
    .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
}

/// Expiry of a password-reset token issued at `now`.
pub fn reset_token_expiry(now: DateTime<Utc>, ttl_minutes: i64) -> Result<DateTime<Utc>, AppError> {
  offset_from(now, Duration::try_minutes(ttl_minutes))
}

fn offset_from(now: DateTime<Utc>, ttl: Option<Duration>) -> Result<DateTime<Utc>, AppError> {
  ttl
    .and_then(|ttl| now.checked_add_signed(ttl))
    .ok_or_else(|| AppError::Internal("Token lifetime is out of range.".to_string()))
}

/// Verifies signature and expiry. Token version is checked by the caller
/// against the stored user.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
  let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())?;
  Ok(data.claims)
}

/// 32 random bytes, hex encoded.
pub fn generate_reset_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn normalize_email(email: &str) -> String {
  email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::NewUser;

  fn sample_user() -> User {
    NewUser {
      name: "Ops".to_string(),
      email: "ops@example.com".to_string(),
      password_hash: String::new(),
      role: Role::User,
    }
    .into_user(Utc::now())
  }

  #[test]
  fn hash_then_verify() {
    let hash = hash_password("correct horse").unwrap();
    assert!(verify_password(&hash, "correct horse").unwrap());
    assert!(!verify_password(&hash, "wrong horse").unwrap());
  }

  #[test]
  fn token_carries_id_version_and_role() {
    let mut user = sample_user();
    user.token_version = 3;
    let token = issue_token(&user, "secret", 1, Utc::now()).unwrap();
    let claims = decode_token(&token, "secret").unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.ver, 3);
    assert_eq!(claims.role, Role::User);
  }

  #[test]
  fn expired_or_foreign_tokens_are_auth_errors() {
    let user = sample_user();
    let stale = issue_token(&user, "secret", 1, Utc::now() - Duration::hours(3)).unwrap();
    match decode_token(&stale, "secret") {
      Err(AppError::Auth(msg)) => assert!(msg.contains("expired")),
      other => panic!("expected expiry error, got {:?}", other),
    }

    let token = issue_token(&user, "secret", 1, Utc::now()).unwrap();
    assert!(matches!(decode_token(&token, "other"), Err(AppError::Auth(_))));
  }

  #[test]
  fn oversized_lifetimes_are_errors_not_panics() {
    let user = sample_user();
    assert!(matches!(
      issue_token(&user, "secret", 9_000_000_000_000_000, Utc::now()),
      Err(AppError::Internal(_))
    ));
    assert!(matches!(
      reset_token_expiry(Utc::now(), i64::MAX),
      Err(AppError::Internal(_))
    ));

    let now = Utc::now();
    assert_eq!(reset_token_expiry(now, 60).unwrap(), now + Duration::minutes(60));
  }

  #[test]
  fn reset_tokens_are_long_and_distinct() {
    let a = generate_reset_token();
    let b = generate_reset_token();
    assert_eq!(a.len(), 64);
    assert_ne!(a, b);
  }
}
