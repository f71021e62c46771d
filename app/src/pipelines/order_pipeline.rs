// app/src/pipelines/order_pipeline.rs

use crate::errors::AppError;
use crate::models::{Order, OrderStatus};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::PlaceOrderCtxData;
use chrono::Utc;
use stockflow::{FlowData, FlowRegistry, StepControl, Workflow};
use tracing::{event, info, Level};
use uuid::Uuid;

/// Registers the order placement pipeline. Placing an order checks stock
/// but does not reserve or decrement it.
pub fn register_place_order_pipeline(flows: &FlowRegistry<AppError>) {
  let mut order_p = Workflow::<PlaceOrderCtxData, AppError>::new(&[
    ("validate_order_input", false, None),
    ("snapshot_order_lines", false, None),
    ("check_order_stock", false, None),
    ("persist_order", false, None),
  ]);

  order_p.on_root("validate_order_input", |ctx_data: FlowData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let customer_name = common_steps::validate_customer_name(&guard.request.customer_name)?;
      guard.request.customer_name = customer_name;
      guard.request.contact_info = guard
        .request
        .contact_info
        .take()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  order_p.on_root("snapshot_order_lines", |ctx_data: FlowData<PlaceOrderCtxData>| {
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

  order_p.on_root("check_order_stock", |ctx_data: FlowData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (store, lines) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.lines.clone())
      };
      common_steps::check_stock(store.as_ref(), &lines).await?;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  order_p.on_root("persist_order", |ctx_data: FlowData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (store, order) = {
        let guard = ctx_data.read();
        let now = Utc::now();
        let order = Order {
          id: Uuid::new_v4(),
          user_id: guard.actor.id,
          customer_name: guard.request.customer_name.clone(),
          contact_info: guard.request.contact_info.clone(),
          lines: guard.lines.clone(),
          status: OrderStatus::Pending,
          created_at: now,
          updated_at: now,
        };
        (guard.app_state.store.clone(), order)
      };

      event!(Level::DEBUG, order_id = %order.id, user_id = %order.user_id, "Persisting order.");
      let saved = store.insert_order(order).await?;
      info!(order_id = %saved.id, lines = saved.lines.len(), "Order placed.");
      ctx_data.write().created_order = Some(saved);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  flows.register(order_p);
  info!("Order placement pipeline registered.");
}
