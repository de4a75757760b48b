// File: services/cabinet_backend/src/main.rs
use cabinet_backend::{build_app, AppState, CabinetServiceFactory, StartupError};
use cabinet_common::logging;
use cabinet_common::services::ServiceFactory;
use cabinet_config::load_config;
use cabinet_db::open_reservation_store;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = Arc::new(load_config()?);
    let _log_guard = logging::init_from_config(&config.logging);

    let service_factory: Arc<dyn ServiceFactory> = Arc::new(CabinetServiceFactory::new(&config));
    let store = open_reservation_store(&config).await?;
    let state = AppState::new(config.clone(), service_factory);

    // Static pages (booking form, success and cancel pages)
    let app = build_app(state, store)?.fallback_service(ServeDir::new("public"));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
