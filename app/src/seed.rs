// app/src/seed.rs

//! Startup wiring: backend selection and admin seeding.

use crate::config::{AppConfig, StoreBackend};
use crate::errors::{AppError, Result};
use crate::models::{NewUser, Role};
use crate::services::auth_service;
use crate::store::{InventoryStore, MemoryStore, PgStore};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};

/// Connects to (and migrates) Postgres, or builds an empty in-memory store.
pub async fn build_store(config: &AppConfig) -> Result<Arc<dyn InventoryStore>> {
  match config.store_backend {
    StoreBackend::Memory => {
      warn!("Using the in-memory store; data is lost on shutdown.");
      Ok(Arc::new(MemoryStore::new()))
    }
    StoreBackend::Postgres => {
      let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is not set.".to_string()))?;
      let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
      info!("Connected to the database.");
      let store = PgStore::new(pool);
      store.migrate().await?;
      info!("Database migrations applied.");
      Ok(Arc::new(store))
    }
  }
}

/// Creates the configured admin account if no account uses that email yet.
pub async fn seed_admin(store: &dyn InventoryStore, config: &AppConfig) -> Result<()> {
  let (Some(email), Some(password)) = (&config.seed_admin_email, &config.seed_admin_password) else {
    return Ok(());
  };

  let email = auth_service::normalize_email(email);
  if let Some(existing) = store.find_user_by_email(&email).await? {
    if existing.role != Role::Admin {
      warn!(%email, "Seed admin email belongs to a non-admin account; leaving it unchanged.");
    }
    return Ok(());
  }

  auth_service::check_password_strength(password)?;
  let admin = NewUser {
    name: "Administrator".to_string(),
    email: email.clone(),
    password_hash: auth_service::hash_password(password)?,
    role: Role::Admin,
  }
  .into_user(Utc::now());
  store.insert_user(admin).await?;
  info!(%email, "Seeded admin account.");
  Ok(())
}
