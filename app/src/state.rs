// app/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::store::InventoryStore;
use std::sync::Arc;
use stockflow::FlowRegistry;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn InventoryStore>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the store and config together and registers every workflow.
  pub fn build(store: Arc<dyn InventoryStore>, config: Arc<AppConfig>) -> Self {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_pipelines(&flows);
    Self { store, flows, config }
  }
}
