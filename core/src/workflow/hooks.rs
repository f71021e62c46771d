// core/src/workflow/hooks.rs

//! `before`, `on` and `after` handler registration.
//!
//! Handlers may fail with any error that converts into the workflow's `Err`,
//! so a step can use `FlowError` or a service error directly without mapping.
//!
//! # Panics
//!
//! Every registration method panics if the step is not part of the workflow.
//! Workflows are wired once at startup and a typo there is a programming
//! error, not a runtime condition.

use crate::core::control::StepControl;
use crate::core::flow_data::FlowData;
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::workflow::definition::Workflow;
use std::collections::HashMap;
use std::future::Future;

fn wrap<TData, Err, F, HandlerErr>(handler_fn: impl Fn(FlowData<TData>) -> F + Send + Sync + 'static) -> Handler<TData, Err>
where
  TData: 'static + Send + Sync,
  F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
  HandlerErr: Into<Err> + Send + Sync + 'static,
{
  Box::new(move |ctx_data| {
    let fut = handler_fn(ctx_data);
    Box::pin(async move { fut.await.map_err(Into::into) })
  })
}

fn push_handler<TData: 'static + Send + Sync, Err>(
  table: &mut HashMap<String, Vec<Handler<TData, Err>>>,
  step_name: &str,
  handler: Handler<TData, Err>,
) {
  table.entry(step_name.to_string()).or_default().push(handler);
}

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn before_root<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.assert_step_defined(step_name);
    push_handler(&mut self.before, step_name, wrap(handler_fn));
  }

  pub fn on_root<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.assert_step_defined(step_name);
    push_handler(&mut self.on, step_name, wrap(handler_fn));
  }

  pub fn after_root<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.assert_step_defined(step_name);
    push_handler(&mut self.after, step_name, wrap(handler_fn));
  }
}
