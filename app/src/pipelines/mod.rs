// app/src/pipelines/mod.rs

//! Defines and registers every workflow used by the stockroom service.

use crate::errors::AppError;
use stockflow::FlowRegistry;

pub mod common_steps;
pub mod contexts;

pub mod fulfillment_pipeline;
pub mod order_pipeline;
pub mod password_reset_pipeline;
pub mod sale_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers all workflows. Called once when the application state is built.
pub fn register_all_pipelines(flows: &FlowRegistry<AppError>) {
  tracing::info!("Registering workflows...");

  signup_pipeline::register_signup_pipeline(flows);
  signin_pipeline::register_signin_pipeline(flows);
  password_reset_pipeline::register_forgot_password_pipeline(flows);
  password_reset_pipeline::register_reset_password_pipeline(flows);
  order_pipeline::register_place_order_pipeline(flows);
  sale_pipeline::register_direct_sale_pipeline(flows);
  fulfillment_pipeline::register_fulfillment_pipeline(flows);

  tracing::info!("All workflows registered.");
}
