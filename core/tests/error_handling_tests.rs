// tests/error_handling_tests.rs
mod common;

use common::*;
use stockflow::{FlowData, FlowError, FlowOutcome, StepControl, Workflow};

#[tokio::test]
async fn workflow_can_use_flow_error_directly() {
  setup_tracing();
  let mut wf = Workflow::<LedgerCtx, FlowError>::new(&[("task", false, None)]);
  wf.on_root("task", |ctx: FlowData<LedgerCtx>| {
    Box::pin(async move {
      ctx.write().units = 7;
      Ok::<_, FlowError>(StepControl::Continue)
    })
  });
  let ctx = FlowData::new(LedgerCtx::default());
  assert_eq!(wf.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(ctx.read().units, 7);

  let mut failing = Workflow::<LedgerCtx, FlowError>::new(&[("task", false, None)]);
  failing.on_root("task", |_ctx: FlowData<LedgerCtx>| {
    Box::pin(async move { Err::<StepControl, _>(FlowError::Internal("ledger closed".to_string())) })
  });
  match failing.run(FlowData::new(LedgerCtx::default())).await {
    Err(FlowError::Internal(msg)) => assert_eq!(msg, "ledger closed"),
    other => panic!("expected FlowError::Internal, got {:?}", other),
  }
}

#[test]
fn anyhow_errors_become_handler_errors() {
  let err: FlowError = anyhow::anyhow!("scanner offline").into();
  match err {
    FlowError::HandlerError { source } => assert_eq!(source.to_string(), "scanner offline"),
    other => panic!("unexpected {:?}", other),
  }
}

#[test]
fn wrapped_flow_errors_are_unwrapped_from_anyhow() {
  let wrapped = anyhow::Error::new(FlowError::StepNotFound {
    step_name: "count".to_string(),
  });
  let err: FlowError = wrapped.into();
  assert!(matches!(err, FlowError::StepNotFound { ref step_name } if step_name == "count"));
}
