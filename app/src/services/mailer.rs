// app/src/services/mailer.rs

//! Outgoing mail. Delivery is simulated and logged.

use crate::errors::{AppError, Result};
use tracing::info;

#[derive(Debug)]
pub struct SentEmailInfo {
  pub to: String,
  pub subject: String,
  pub message_id: String,
}

pub async fn send_mock_email(to: &str, from: &str, subject: &str, html_body: &str) -> Result<SentEmailInfo> {
  info!(to, from, subject, body_len = html_body.len(), "Simulating email delivery.");
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;

  if !to.contains('@') {
    return Err(AppError::Internal(format!("Undeliverable address '{}'", to)));
  }

  let message_id = format!("mock_email_{}", uuid::Uuid::new_v4());
  info!(%message_id, "Mock email sent.");
  Ok(SentEmailInfo {
    to: to.to_string(),
    subject: subject.to_string(),
    message_id,
  })
}

pub fn password_reset_link(frontend_base_url: &str, token: &str) -> String {
  format!("{}/reset-password/{}", frontend_base_url.trim_end_matches('/'), token)
}

pub fn password_reset_body(reset_url: &str, ttl_minutes: i64) -> String {
  format!(
    "<h1>Password Reset</h1>\
     <p>You requested a password reset for your Stockroom account.</p>\
     <p><a href=\"{reset_url}\">Reset Password</a></p>\
     <p>This link will expire in {ttl_minutes} minutes.</p>\
     <p>If you didn't request this, ignore this email and your password will remain unchanged.</p>"
  )
}
