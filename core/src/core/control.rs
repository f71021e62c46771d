// core/src/core/control.rs

//! Signals returned by handlers and the outcome of a whole workflow run.

/// Returned by every handler to tell the runner what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Keep going: remaining handlers of this step, then the next step.
  Continue,
  /// Halt the run. Nothing after the current handler executes.
  Stop,
}

/// Outcome of a workflow run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  /// Every step ran (or was skipped by its condition).
  Completed,
  /// A handler returned [`StepControl::Stop`].
  Stopped,
}

impl FlowOutcome {
  pub fn is_completed(self) -> bool {
    matches!(self, FlowOutcome::Completed)
  }
}
