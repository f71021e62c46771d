// tests/workflow_execution_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::sync::Arc;
use stockflow::{FlowData, FlowError, FlowOutcome, SkipCondition, StepControl, Workflow};

#[tokio::test]
#[serial]
async fn steps_run_in_declared_order() {
  setup_tracing();
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[
    ("receive", false, None),
    ("count", false, None),
    ("shelve", false, None),
  ]);
  wf.on_root("receive", adjust("receive", 5));
  wf.on_root("count", adjust("count", 0));
  wf.on_root("shelve", adjust("shelve", -2));

  let ctx = FlowData::new(LedgerCtx::default());
  let outcome = wf.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  let data = ctx.snapshot();
  assert_eq!(data.units, 3);
  assert_eq!(data.trail, vec!["receive", "count", "shelve"]);
}

#[tokio::test]
#[serial]
async fn stop_halts_remaining_steps() {
  setup_tracing();
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[
    ("first", false, None),
    ("halt", false, None),
    ("never", false, None),
  ]);
  wf.on_root("first", adjust("first", 1));
  wf.on_root("halt", adjust("halt", 1));
  wf.on_root("never", adjust("never", 100));

  let ctx = FlowData::new(LedgerCtx {
    stop_at: Some("halt".to_string()),
    ..Default::default()
  });
  let outcome = wf.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Stopped);
  assert_eq!(ctx.read().units, 2);
  assert_eq!(ctx.read().trail, vec!["first", "halt"]);
}

#[tokio::test]
#[serial]
async fn handler_error_aborts_run() {
  setup_tracing();
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[
    ("ok", false, None),
    ("bad", false, None),
    ("later", false, None),
  ]);
  wf.on_root("ok", adjust("ok", 1));
  wf.on_root("bad", reject("bad", "out of range"));
  wf.on_root("later", adjust("later", 1));

  let ctx = FlowData::new(LedgerCtx::default());
  let err = wf.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, LedgerError::Rejected("out of range".to_string()));
  assert_eq!(ctx.read().units, 1);
  assert_eq!(ctx.read().trail, vec!["ok", "bad"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_is_evaluated_against_current_data() {
  setup_tracing();
  let has_units: SkipCondition<LedgerCtx> = Arc::new(|ctx: FlowData<LedgerCtx>| ctx.read().units > 0);
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[
    ("first", false, None),
    ("only_when_empty", false, Some(has_units)),
    ("last", false, None),
  ]);
  wf.on_root("first", adjust("first", 1));
  wf.on_root("only_when_empty", adjust("only_when_empty", 50));
  wf.on_root("last", adjust("last", 1));

  let ctx = FlowData::new(LedgerCtx::default());
  assert_eq!(wf.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(ctx.read().units, 2);
  assert_eq!(ctx.read().trail, vec!["first", "last"]);
}

#[tokio::test]
#[serial]
async fn mandatory_step_without_handlers_fails() {
  setup_tracing();
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[("first", false, None), ("unwired", false, None)]);
  wf.on_root("first", adjust("first", 1));

  let err = wf.run(FlowData::new(LedgerCtx::default())).await.unwrap_err();
  match err {
    LedgerError::Flow(text) => {
      assert!(text.contains("HandlerMissing"));
      assert!(text.contains("unwired"));
    }
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn optional_step_without_handlers_is_passed_over() {
  setup_tracing();
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[("first", false, None), ("notify", true, None)]);
  wf.on_root("first", adjust("first", 1));

  let ctx = FlowData::new(LedgerCtx::default());
  assert_eq!(wf.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(ctx.read().trail, vec!["first"]);
}

#[tokio::test]
#[serial]
async fn before_on_after_phases_run_in_order() {
  setup_tracing();
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[("audit", false, None)]);
  wf.after_root("audit", adjust("after", 0));
  wf.on_root("audit", adjust("on", 0));
  wf.before_root("audit", adjust("before", 0));

  let ctx = FlowData::new(LedgerCtx::default());
  wf.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["before", "on", "after"]);
}

#[tokio::test]
#[serial]
async fn stop_in_before_phase_skips_on_handlers() {
  setup_tracing();
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[("guarded", false, None)]);
  wf.before_root("guarded", |ctx: FlowData<LedgerCtx>| {
    Box::pin(async move {
      ctx.write().trail.push("guard".to_string());
      Ok::<_, FlowError>(StepControl::Stop)
    })
  });
  wf.on_root("guarded", adjust("on", 10));

  let ctx = FlowData::new(LedgerCtx::default());
  assert_eq!(wf.run(ctx.clone()).await.unwrap(), FlowOutcome::Stopped);
  assert_eq!(ctx.read().units, 0);
  assert_eq!(ctx.read().trail, vec!["guard"]);
}

#[tokio::test]
#[serial]
async fn structural_edits_reshape_the_run() {
  setup_tracing();
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[("a", false, None), ("c", false, None)]);
  wf.insert_after_step("a", "b", false, None).unwrap();
  wf.insert_before_step("a", "zero", true, None).unwrap();
  assert_eq!(wf.step_names(), vec!["zero", "a", "b", "c"]);

  wf.on_root("a", adjust("a", 1));
  wf.on_root("b", adjust("b", 1));
  wf.on_root("c", adjust("c", 1));
  wf.remove_step("c").unwrap();

  let ctx = FlowData::new(LedgerCtx::default());
  wf.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["a", "b"]);
}

#[tokio::test]
#[serial]
async fn structural_edits_report_unknown_and_duplicate_steps() {
  setup_tracing();
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[("a", false, None)]);

  assert!(matches!(
    wf.insert_after_step("missing", "b", false, None),
    Err(FlowError::StepNotFound { .. })
  ));
  assert!(matches!(
    wf.insert_after_step("a", "a", false, None),
    Err(FlowError::DuplicateStep { .. })
  ));
  assert!(matches!(wf.remove_step("missing"), Err(FlowError::StepNotFound { .. })));
  assert!(matches!(wf.set_optional("missing", true), Err(FlowError::StepNotFound { .. })));

  wf.set_optional("a", true).unwrap();
  let ctx = FlowData::new(LedgerCtx::default());
  assert_eq!(wf.run(ctx).await.unwrap(), FlowOutcome::Completed);
}

#[tokio::test]
#[serial]
async fn set_skip_condition_can_be_cleared() {
  setup_tracing();
  let always: SkipCondition<LedgerCtx> = Arc::new(|_ctx: FlowData<LedgerCtx>| true);
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[("a", false, Some(always))]);
  wf.on_root("a", adjust("a", 1));

  let ctx = FlowData::new(LedgerCtx::default());
  wf.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().units, 0);

  wf.set_skip_condition("a", None).unwrap();
  wf.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().units, 1);
}

#[test]
#[should_panic(expected = "not defined")]
fn hooking_an_unknown_step_panics() {
  let mut wf = Workflow::<LedgerCtx, LedgerError>::new(&[("a", false, None)]);
  wf.on_root("b", adjust("b", 1));
}
