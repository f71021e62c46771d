// app/src/web/routes.rs

use crate::web::handlers::{auth_handlers, dashboard_handlers, order_handlers, product_handlers, sale_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts every route under `/api`. Literal segments (`/all`, `/mine`,
/// `/low-stock`) are registered before `/{id}` so they are not parsed as ids.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/users")
          .route("/register", web::post().to(auth_handlers::register_handler))
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/forgot-password", web::post().to(auth_handlers::forgot_password_handler))
          .route("/reset-password", web::post().to(auth_handlers::reset_password_handler))
          .route("/logout", web::get().to(auth_handlers::logout_handler))
          .route("/me", web::get().to(auth_handlers::me_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_active_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/all", web::get().to(product_handlers::list_all_products_handler))
          .route("/low-stock", web::get().to(product_handlers::list_low_stock_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
          .route("/{product_id}/restock", web::put().to(product_handlers::restock_product_handler))
          .route("/{product_id}/deactivate", web::put().to(product_handlers::deactivate_product_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::place_order_handler))
          .route("/all", web::get().to(order_handlers::list_all_orders_handler))
          .route("/mine", web::get().to(order_handlers::list_my_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}", web::delete().to(order_handlers::delete_order_handler))
          .route("/{order_id}/status", web::put().to(order_handlers::update_order_status_handler))
          .route("/{order_id}/fulfill", web::post().to(order_handlers::fulfill_order_handler)),
      )
      .service(
        web::scope("/sales")
          .route("", web::post().to(sale_handlers::create_sale_handler))
          .route("", web::get().to(sale_handlers::list_sales_handler))
          .route("/{sale_id}", web::get().to(sale_handlers::get_sale_handler)),
      )
      .service(web::scope("/dashboard").route("/summary", web::get().to(dashboard_handlers::summary_handler))),
  );
}
