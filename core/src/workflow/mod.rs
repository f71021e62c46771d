// core/src/workflow/mod.rs

//! The `Workflow` type: definition and structural edits, hook registration,
//! and execution.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::Workflow;
