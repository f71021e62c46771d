// app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "pg" => Ok(StoreBackend::Postgres),
      "memory" | "mem" => Ok(StoreBackend::Memory),
      other => Err(AppError::Config(format!("Unknown STORE_BACKEND '{}'", other))),
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  pub database_url: Option<String>,

  pub jwt_secret: String,
  pub jwt_ttl_hours: i64,
  pub reset_token_ttl_minutes: i64,

  pub frontend_base_url: String,
  pub mail_sender: String,

  pub low_stock_threshold: i32,

  pub seed_admin_email: Option<String>,
  pub seed_admin_password: Option<String>,
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("store_backend", &self.store_backend)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("jwt_secret", &"[REDACTED]")
      .field("jwt_ttl_hours", &self.jwt_ttl_hours)
      .field("reset_token_ttl_minutes", &self.reset_token_ttl_minutes)
      .field("frontend_base_url", &self.frontend_base_url)
      .field("mail_sender", &self.mail_sender)
      .field("low_stock_threshold", &self.low_stock_threshold)
      .field("seed_admin_email", &self.seed_admin_email)
      .finish()
  }
}

/// Upper bounds keep token expiry arithmetic inside chrono's range.
pub const MAX_JWT_TTL_HOURS: i64 = 24 * 365;
pub const MAX_RESET_TOKEN_TTL_MINUTES: i64 = 24 * 60;

fn check_range(var_name: &str, value: i64, max: i64) -> Result<i64> {
  if value <= 0 || value > max {
    return Err(AppError::Config(format!("{} must be between 1 and {}, got {}", var_name, max, value)));
  }
  Ok(value)
}

fn parse_var<T>(var_name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(v) => v
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e))),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok().filter(|v| !v.is_empty()))
  }

  /// Builds the config from an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_var("SERVER_PORT", lookup("SERVER_PORT"), 8080u16)?;
    let store_backend = parse_var("STORE_BACKEND", lookup("STORE_BACKEND"), StoreBackend::Postgres)?;

    let database_url = lookup("DATABASE_URL");
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required when STORE_BACKEND=postgres)".to_string(),
      ));
    }

    let jwt_secret = lookup("JWT_SECRET")
      .ok_or_else(|| AppError::Config("Missing environment variable 'JWT_SECRET'".to_string()))?;
    let jwt_ttl_hours = check_range(
      "JWT_TTL_HOURS",
      parse_var("JWT_TTL_HOURS", lookup("JWT_TTL_HOURS"), 720i64)?,
      MAX_JWT_TTL_HOURS,
    )?;
    let reset_token_ttl_minutes = check_range(
      "RESET_TOKEN_TTL_MINUTES",
      parse_var("RESET_TOKEN_TTL_MINUTES", lookup("RESET_TOKEN_TTL_MINUTES"), 60i64)?,
      MAX_RESET_TOKEN_TTL_MINUTES,
    )?;

    let frontend_base_url = lookup("FRONTEND_BASE_URL").unwrap_or_else(|| "http://localhost:5173".to_string());
    let mail_sender = lookup("MAIL_SENDER").unwrap_or_else(|| "noreply@stockroom.local".to_string());

    let low_stock_threshold = parse_var("LOW_STOCK_THRESHOLD", lookup("LOW_STOCK_THRESHOLD"), 10i32)?;

    let seed_admin_email = lookup("SEED_ADMIN_EMAIL");
    let seed_admin_password = lookup("SEED_ADMIN_PASSWORD");
    if seed_admin_email.is_some() != seed_admin_password.is_some() {
      return Err(AppError::Config(
        "SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must be set together".to_string(),
      ));
    }

    let config = Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      jwt_secret,
      jwt_ttl_hours,
      reset_token_ttl_minutes,
      frontend_base_url,
      mail_sender,
      low_stock_threshold,
      seed_admin_email,
      seed_admin_password,
    };
    tracing::info!(config = ?config, "Application configuration loaded.");
    Ok(config)
  }
}
