// app/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod dashboard_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod sale_handlers;

use crate::errors::AppError;
use stockflow::FlowOutcome;
use tracing::warn;

/// Every workflow in this service is expected to run to completion; a
/// handler-initiated stop is treated as an internal fault.
pub(crate) fn expect_completed(outcome: FlowOutcome, workflow: &str) -> Result<(), AppError> {
  if outcome.is_completed() {
    return Ok(());
  }
  warn!(workflow, "Workflow was stopped by a handler.");
  Err(AppError::Internal(format!("{} was halted by an internal step.", workflow)))
}
