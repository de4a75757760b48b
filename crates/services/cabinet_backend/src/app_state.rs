// --- File: crates/services/cabinet_backend/src/app_state.rs ---
use cabinet_common::services::ServiceFactory;
use cabinet_config::AppConfig;
use std::sync::Arc;

/// State shared by the backend's own routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service_factory: Arc<dyn ServiceFactory>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, service_factory: Arc<dyn ServiceFactory>) -> Self {
        Self {
            config,
            service_factory,
        }
    }
}
