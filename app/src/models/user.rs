// app/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  User,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role: Role,
  #[serde(skip_serializing)]
  pub token_version: i32,
  #[serde(skip_serializing)]
  pub reset_token: Option<String>,
  #[serde(skip_serializing)]
  pub reset_expires: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

/// A user about to be inserted; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name: String,
  pub email: String,
  pub password_hash: String,
  pub role: Role,
}

impl NewUser {
  pub fn into_user(self, now: DateTime<Utc>) -> User {
    User {
      id: Uuid::new_v4(),
      name: self.name,
      email: self.email,
      password_hash: self.password_hash,
      role: self.role,
      token_version: 0,
      reset_token: None,
      reset_expires: None,
      created_at: now,
      updated_at: now,
    }
  }
}
