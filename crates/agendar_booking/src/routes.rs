// --- File: crates/agendar_booking/src/routes.rs ---

use std::sync::Arc;

use axum::{routing::post, Router};

use agendar_common::services::AutomationService;
use agendar_config::AppConfig;

use crate::handlers::{create_booking_handler, verify_email_handler, BookingState};

/// Creates a router containing the booking and verification routes.
pub fn routes(config: Arc<AppConfig>, automation: Arc<dyn AutomationService>) -> Router {
    let state = Arc::new(BookingState { config, automation });

    Router::new()
        .route("/booking", post(create_booking_handler))
        .route("/verify", post(verify_email_handler))
        .with_state(state)
}
