// core/src/workflow/definition.rs

use crate::core::handler::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::{FlowError, FlowResult};
use std::collections::HashMap;

/// An ordered set of named steps over context data `TData`, whose handlers
/// fail with `Err`.
///
/// `Err` must absorb [`FlowError`] so that engine faults (a mandatory step
/// with no handler, for instance) surface through the same error type as
/// business failures.
pub struct Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Builds a workflow from `(name, optional, skip_if)` triples, in run order.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef::new(*name, *optional, skip_if.clone()))
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn has_step(&self, step_name: &str) -> bool {
    self.steps.iter().any(|s| s.name == step_name)
  }

  fn position_of(&self, step_name: &str) -> FlowResult<usize> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  fn step_mut(&mut self, step_name: &str) -> FlowResult<&mut StepDef<TData>> {
    let idx = self.position_of(step_name)?;
    Ok(&mut self.steps[idx])
  }

  /// Hook registration treats an unknown step as a wiring bug.
  pub(crate) fn assert_step_defined(&self, step_name: &str) {
    if !self.has_step(step_name) {
      panic!("stockflow: step '{}' is not defined in this workflow", step_name);
    }
  }

  fn insert_at(
    &mut self,
    idx: usize,
    new_step_name: String,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) -> FlowResult<()> {
    if self.has_step(&new_step_name) {
      return Err(FlowError::DuplicateStep { step_name: new_step_name });
    }
    self.steps.insert(idx, StepDef::new(new_step_name, optional, skip_if));
    Ok(())
  }

  pub fn insert_before_step(
    &mut self,
    existing_step_name: &str,
    new_step_name: impl Into<String>,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) -> FlowResult<()> {
    let idx = self.position_of(existing_step_name)?;
    self.insert_at(idx, new_step_name.into(), optional, skip_if)
  }

  pub fn insert_after_step(
    &mut self,
    existing_step_name: &str,
    new_step_name: impl Into<String>,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) -> FlowResult<()> {
    let idx = self.position_of(existing_step_name)?;
    self.insert_at(idx + 1, new_step_name.into(), optional, skip_if)
  }

  /// Removes a step together with every handler attached to it.
  pub fn remove_step(&mut self, step_name: &str) -> FlowResult<()> {
    let idx = self.position_of(step_name)?;
    self.steps.remove(idx);
    self.before.remove(step_name);
    self.on.remove(step_name);
    self.after.remove(step_name);
    Ok(())
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> FlowResult<()> {
    self.step_mut(step_name)?.optional = optional;
    Ok(())
  }

  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<TData>>) -> FlowResult<()> {
    self.step_mut(step_name)?.skip_if = skip_if;
    Ok(())
  }
}
