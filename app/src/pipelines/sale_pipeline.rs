// app/src/pipelines/sale_pipeline.rs

use crate::errors::AppError;
use crate::models::Sale;
use crate::pipelines::common_steps;
use crate::pipelines::contexts::DirectSaleCtxData;
use crate::services::inventory::sale_total_cents;
use chrono::Utc;
use stockflow::{FlowData, FlowRegistry, StepControl, Workflow};
use tracing::info;
use uuid::Uuid;

/// Registers the direct (counter) sale pipeline. The total is always
/// computed from current catalog prices.
pub fn register_direct_sale_pipeline(flows: &FlowRegistry<AppError>) {
  let mut sale_p = Workflow::<DirectSaleCtxData, AppError>::new(&[
    ("validate_sale_input", false, None),
    ("snapshot_sale_lines", false, None),
    ("check_sale_stock", false, None),
    ("commit_sale", false, None),
  ]);

  sale_p.on_root("validate_sale_input", |ctx_data: FlowData<DirectSaleCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      guard.request.customer_name = guard
        .request
        .customer_name
        .take()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  sale_p.on_root("snapshot_sale_lines", |ctx_data: FlowData<DirectSaleCtxData>| {
    Box::pin(async move {
      let (store, requests) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.request.lines.clone())
      };
      let lines = common_steps::snapshot_lines(store.as_ref(), &requests).await?;
      ctx_data.write().lines = lines;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  sale_p.on_root("check_sale_stock", |ctx_data: FlowData<DirectSaleCtxData>| {
    Box::pin(async move {
      let (store, lines) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.lines.clone())
      };
      common_steps::check_stock(store.as_ref(), &lines).await?;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  sale_p.on_root("commit_sale", |ctx_data: FlowData<DirectSaleCtxData>| {
    Box::pin(async move {
      let (store, actor_id, sale) = {
        let guard = ctx_data.read();
        let sale = Sale {
          id: Uuid::new_v4(),
          order_id: None,
          customer_name: guard.request.customer_name.clone(),
          total_cents: sale_total_cents(&guard.lines)?,
          lines: guard.lines.clone(),
          sold_at: Utc::now(),
        };
        (guard.app_state.store.clone(), guard.actor.id, sale)
      };

      let saved = store.commit_sale(sale).await?;
      info!(sale_id = %saved.id, %actor_id, total_cents = saved.total_cents, "Direct sale recorded.");
      ctx_data.write().sale = Some(saved);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  flows.register(sale_p);
  info!("Direct sale pipeline registered.");
}
