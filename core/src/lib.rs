// core/src/lib.rs

//! Stockflow: async step workflows for the stockroom service.
//!
//! A [`Workflow`] is an ordered list of named steps. Each step can carry
//! `before`, `on` and `after` handlers that receive a shared [`FlowData`]
//! and decide whether the run continues or stops. Workflows are registered
//! in a [`FlowRegistry`] keyed by their context data type, so a caller only
//! needs the context value to dispatch the right workflow.
//!
//! ```ignore
//! let mut wf = Workflow::<ReserveCtx, AppError>::new(&[
//!   ("load_order", false, None),
//!   ("notify", true, None),
//! ]);
//! wf.on_root("load_order", |ctx| Box::pin(async move { Ok::<_, AppError>(StepControl::Continue) }));
//! registry.register(wf);
//! registry.run(FlowData::new(ReserveCtx::default())).await?;
//! ```

pub mod core;
pub mod error;
pub mod registry;
pub mod workflow;

pub use crate::core::control::{FlowOutcome, StepControl};
pub use crate::core::flow_data::FlowData;
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::workflow::definition::Workflow;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;
