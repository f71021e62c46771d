// app/src/services/mod.rs

pub mod auth_service;
pub mod dashboard;
pub mod inventory;
pub mod mailer;
