// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use stockflow::{FlowData, FlowError, Handler, StepControl};
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct LedgerCtx {
  pub units: i32,
  pub trail: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
  /// Engine errors are flattened to their Debug text so tests can compare them.
  #[error("workflow engine: {0}")]
  Flow(String),

  #[error("step rejected: {0}")]
  Rejected(String),
}

impl From<FlowError> for LedgerError {
  fn from(err: FlowError) -> Self {
    LedgerError::Flow(format!("{:?}", err))
  }
}

/// Adds `delta` units and records the step; stops if `stop_at` names this step.
pub fn adjust(step_name: &'static str, delta: i32) -> Handler<LedgerCtx, LedgerError> {
  Box::new(move |ctx: FlowData<LedgerCtx>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.units += delta;
      guard.trail.push(step_name.to_string());
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(StepControl::Stop);
      }
      Ok(StepControl::Continue)
    })
  })
}

pub fn reject(step_name: &'static str, reason: &'static str) -> Handler<LedgerCtx, LedgerError> {
  Box::new(move |ctx: FlowData<LedgerCtx>| {
    Box::pin(async move {
      ctx.write().trail.push(step_name.to_string());
      Err(LedgerError::Rejected(reason.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
