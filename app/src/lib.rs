// app/src/lib.rs

//! Stockroom: inventory, orders and sales over a REST API.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use config::AppConfig;
pub use errors::AppError;
pub use state::AppState;
