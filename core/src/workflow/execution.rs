// core/src/workflow/execution.rs

//! `Workflow::run`: walks the steps in order and drives each phase's handlers.

use crate::core::control::{FlowOutcome, StepControl};
use crate::core::flow_data::FlowData;
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::workflow::definition::Workflow;
use tracing::{event, info_span, instrument, Instrument, Level};

#[derive(Debug, Clone, Copy)]
enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  fn label(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

/// Runs one phase of one step. `Some(Stopped)` means a handler halted the run.
async fn run_phase<TData, Err>(
  phase: Phase,
  handlers: Option<&Vec<Handler<TData, Err>>>,
  ctx_data: &FlowData<TData>,
) -> Result<Option<FlowOutcome>, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  let Some(handlers) = handlers else {
    return Ok(None);
  };

  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    let span = info_span!("workflow_handler", phase = phase.label(), handler_index = handler_idx);
    match handler_fn(ctx_data.clone()).instrument(span).await {
      Ok(StepControl::Continue) => {}
      Ok(StepControl::Stop) => {
        event!(Level::INFO, phase = phase.label(), "Workflow stopped by handler.");
        return Ok(Some(FlowOutcome::Stopped));
      }
      Err(e) => {
        event!(Level::WARN, phase = phase.label(), error = %e, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(None)
}

fn has_any<TData: 'static + Send + Sync, Err>(handlers: Option<&Vec<Handler<TData, Err>>>) -> bool {
  handlers.map_or(false, |v| !v.is_empty())
}

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes every step against `ctx_data`.
  ///
  /// A step whose skip condition holds is passed over. A step with no
  /// handlers at all is passed over when optional and is a
  /// [`FlowError::HandlerMissing`] otherwise. The first handler error aborts
  /// the run and is returned unchanged.
  #[instrument(
    name = "Workflow::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: FlowData<TData>) -> Result<FlowOutcome, Err> {
    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(Level::DEBUG, step = step_name, "Step skipped by condition.");
          continue;
        }
      }

      let before = self.before.get(step_name);
      let on = self.on.get(step_name);
      let after = self.after.get(step_name);

      if !has_any(before) && !has_any(on) && !has_any(after) {
        if step_def.optional {
          event!(Level::DEBUG, step = step_name, "Optional step has no handlers.");
          continue;
        }
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      let step_span = info_span!(
        "workflow_step",
        step = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      let step_result = async {
        for (phase, handlers) in [(Phase::Before, before), (Phase::On, on), (Phase::After, after)] {
          if let Some(outcome) = run_phase(phase, handlers, &ctx_data).await? {
            return Ok(Some(outcome));
          }
        }
        Ok::<_, Err>(None)
      }
      .instrument(step_span)
      .await?;

      if let Some(outcome) = step_result {
        return Ok(outcome);
      }
    }

    event!(Level::DEBUG, "Workflow completed.");
    Ok(FlowOutcome::Completed)
  }
}
