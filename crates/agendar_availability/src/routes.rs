// --- File: crates/agendar_availability/src/routes.rs ---

use std::sync::Arc;

use axum::{routing::get, Router};

use agendar_common::services::AutomationService;
use agendar_config::AppConfig;

use crate::handlers::{get_availability_handler, AvailabilityState};

/// Creates a router containing the availability routes.
pub fn routes(config: Arc<AppConfig>, automation: Arc<dyn AutomationService>) -> Router {
    let state = Arc::new(AvailabilityState { config, automation });

    Router::new()
        .route("/availability", get(get_availability_handler))
        .with_state(state)
}
