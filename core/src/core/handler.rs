// core/src/core/handler.rs

use crate::core::control::StepControl;
use crate::core::flow_data::FlowData;
use std::future::Future;
use std::pin::Pin;

/// Boxed future produced by a handler.
pub type HandlerFuture<Err> = Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>>;

/// A step handler: receives a handle to the run's context data and resolves
/// to a [`StepControl`] or the workflow's error type.
pub type Handler<TData, Err> = Box<dyn Fn(FlowData<TData>) -> HandlerFuture<Err> + Send + Sync>;
