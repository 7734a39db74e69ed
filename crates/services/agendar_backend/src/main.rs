// File: services/agendar_backend/src/main.rs
use axum::http::header::{CONTENT_TYPE, ORIGIN};
use axum::http::Method;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use agendar_availability::routes as availability_routes;
use agendar_booking::routes as booking_routes;
use agendar_common::services::AutomationService;
use agendar_config::load_config;
use agendar_make::MakeAutomationService;

#[tokio::main]
async fn main() {
    agendar_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));
    let make_config = config
        .make
        .clone()
        .expect("Make webhook configuration missing (set [make] in config or AGENDAR_MAKE__* env)");
    let automation: Arc<dyn AutomationService> = Arc::new(MakeAutomationService::new(make_config));

    if !config.use_daily_fallback {
        warn!("daily fallback disabled; single-day outages will surface as 502");
    }

    let api_router = Router::new()
        .route("/", get(|| async { "Agendar API" }))
        .merge(availability_routes::routes(
            config.clone(),
            automation.clone(),
        ))
        .merge(booking_routes::routes(config.clone(), automation.clone()));

    // The widget is embedded on third-party pages, so the allowed origin is
    // whatever origin asked (echoed back, with Vary: Origin). OPTIONS
    // preflight is answered by the layer on every route.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ORIGIN]);

    #[allow(unused_mut)] // openapi needs it mutable
    let mut app = Router::new().nest("/api", api_router).layer(cors);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use agendar_availability::doc::AvailabilityApiDoc;
        use agendar_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Agendar API",
                version = "0.1.0",
                description = "Appointment availability and booking API",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags((name = "Agendar", description = "Core service endpoints")),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(AvailabilityApiDoc::openapi());
        openapi_doc.merge(BookingApiDoc::openapi());
        info!("adding Swagger UI at /api/docs");

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.expect("bind server address");
    info!("starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server loop");
}
