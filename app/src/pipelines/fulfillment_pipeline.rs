// app/src/pipelines/fulfillment_pipeline.rs

//! Order fulfillment: a Pending order becomes a sale, stock is decremented
//! and the order is marked Processed.
//!
//! The steps before `commit_fulfillment` give early, complete answers
//! (missing order, wrong state, every shortfall). `commit_fulfillment`
//! hands the whole write to the store, which repeats the state and stock
//! checks inside its own transactional boundary.

use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::FulfillOrderCtxData;
use crate::services::dashboard::is_low_stock;
use crate::services::inventory::sale_total_cents;
use chrono::Utc;
use stockflow::{FlowData, FlowRegistry, StepControl, Workflow};
use tracing::{event, info, warn, Level};

pub const STEPS: [&str; 6] = [
  "load_order",
  "ensure_order_pending",
  "check_stock_levels",
  "compute_sale_total",
  "commit_fulfillment",
  "flag_low_stock",
];

pub fn register_fulfillment_pipeline(flows: &FlowRegistry<AppError>) {
  let mut fulfill_p = Workflow::<FulfillOrderCtxData, AppError>::new(&[
    (STEPS[0], false, None),
    (STEPS[1], false, None),
    (STEPS[2], false, None),
    (STEPS[3], false, None),
    (STEPS[4], false, None),
    (STEPS[5], true, None),
  ]);

  fulfill_p.on_root("load_order", load_order);
  fulfill_p.on_root("ensure_order_pending", ensure_order_pending);
  fulfill_p.on_root("check_stock_levels", check_stock_levels);
  fulfill_p.on_root("compute_sale_total", compute_sale_total);
  fulfill_p.on_root("commit_fulfillment", commit_fulfillment);
  fulfill_p.on_root("flag_low_stock", flag_low_stock);

  flows.register(fulfill_p);
  info!("Fulfillment pipeline registered.");
}

async fn load_order(ctx_data: FlowData<FulfillOrderCtxData>) -> AppResult<StepControl> {
  let (store, order_id, actor_id) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.order_id, guard.actor.id)
  };

  event!(Level::DEBUG, %order_id, %actor_id, "Loading order for fulfillment.");
  let order = store
    .get_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_id)))?;

  ctx_data.write().order = Some(order);
  Ok(StepControl::Continue)
}

async fn ensure_order_pending(ctx_data: FlowData<FulfillOrderCtxData>) -> AppResult<StepControl> {
  let status = ctx_data
    .read()
    .order
    .as_ref()
    .map(|o| o.status)
    .ok_or_else(|| AppError::Internal("Order missing from fulfillment context.".to_string()))?;

  if status.is_terminal() {
    warn!(current = %status, "Order is not Pending; refusing to fulfill.");
    return Err(AppError::InvalidState { current: status });
  }
  Ok(StepControl::Continue)
}

async fn check_stock_levels(ctx_data: FlowData<FulfillOrderCtxData>) -> AppResult<StepControl> {
  let (store, lines) = {
    let guard = ctx_data.read();
    let lines = guard.order.as_ref().map(|o| o.lines.clone()).unwrap_or_default();
    (guard.app_state.store.clone(), lines)
  };
  common_steps::check_stock(store.as_ref(), &lines).await?;
  Ok(StepControl::Continue)
}

async fn compute_sale_total(ctx_data: FlowData<FulfillOrderCtxData>) -> AppResult<StepControl> {
  let mut guard = ctx_data.write();
  let total = match guard.order.as_ref() {
    Some(order) => sale_total_cents(&order.lines)?,
    None => return Err(AppError::Internal("Order missing from fulfillment context.".to_string())),
  };
  guard.expected_total_cents = Some(total);
  Ok(StepControl::Continue)
}

async fn commit_fulfillment(ctx_data: FlowData<FulfillOrderCtxData>) -> AppResult<StepControl> {
  let (store, order_id, expected_total) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.order_id, guard.expected_total_cents)
  };

  let (order, sale) = store.commit_fulfillment(order_id, Utc::now()).await?;
  if expected_total.is_some_and(|t| t != sale.total_cents) {
    // Lines are immutable, so this only fires if the order row was rewritten underneath us.
    warn!(expected = ?expected_total, recorded = sale.total_cents, "Sale total differs from pre-computed total.");
  }
  info!(%order_id, sale_id = %sale.id, total_cents = sale.total_cents, "Order fulfilled.");

  let mut guard = ctx_data.write();
  guard.order = Some(order);
  guard.sale = Some(sale);
  Ok(StepControl::Continue)
}

/// Never fails the run: the sale is already committed.
async fn flag_low_stock(ctx_data: FlowData<FulfillOrderCtxData>) -> AppResult<StepControl> {
  let (store, threshold, ids) = {
    let guard = ctx_data.read();
    let ids: Vec<_> = guard
      .sale
      .as_ref()
      .map(|s| s.lines.iter().map(|l| l.product_id).collect())
      .unwrap_or_default();
    (guard.app_state.store.clone(), guard.app_state.config.low_stock_threshold, ids)
  };

  match store.get_products(&ids).await {
    Ok(products) => {
      let low: Vec<_> = products.into_iter().filter(|p| is_low_stock(p, threshold)).collect();
      for product in &low {
        warn!(product_id = %product.id, name = %product.name, quantity = product.quantity, "Product is low on stock.");
      }
      ctx_data.write().low_stock = low;
    }
    Err(e) => warn!(error = %e, "Could not evaluate low stock after fulfillment."),
  }
  Ok(StepControl::Continue)
}
