// app/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use stockroom::web::{configure_app_routes, json_config, path_config};
use stockroom::{seed, AppConfig, AppState};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting stockroom server...");

  let app_config = AppConfig::from_env().map(Arc::new).map_err(|e| {
    tracing::error!(error = %e, "Failed to load application configuration.");
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
  })?;

  let store = seed::build_store(&app_config).await.map_err(|e| {
    tracing::error!(error = %e, "Failed to initialise the store.");
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
  })?;

  if let Err(e) = seed::seed_admin(store.as_ref(), &app_config).await {
    tracing::error!(error = %e, "Admin seeding failed.");
    return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
  }

  let app_state = AppState::build(store, app_config.clone());

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .app_data(json_config())
      .app_data(path_config())
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
