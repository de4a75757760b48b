// --- File: crates/services/cabinet_backend/src/app.rs ---
//! Router assembly.
//!
//! Everything lives under `/api`. The calendar feed is always mounted; the
//! checkout and webhook routes only when a payment service is available.

use crate::app_state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use cabinet_booking::{notifier_for, BookingError, BookingPolicy, Pricing, ReservationDesk};
use cabinet_db::ReservationRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub payments: bool,
    pub notifications: bool,
}

#[axum::debug_handler]
async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        payments: state.service_factory.payment_service().is_some(),
        notifications: state.service_factory.notification_service().is_some(),
    })
}

/// Build the `/api` router from the shared state and the reservation store.
///
/// Fails when the booking policy in the configuration is invalid.
pub fn build_app(state: AppState, store: Arc<dyn ReservationRepository>) -> Result<Router, BookingError> {
    let config = state.config.clone();
    let policy = BookingPolicy::from_config(&config.booking)?;

    let mut router = Router::new()
        .route("/", get(|| async { "Welcome to the Cabinet booking API!" }))
        .route("/health", get(health_handler))
        .with_state(state.clone());

    router = router.merge(cabinet_calendar::routes(
        store.clone(),
        config.calendar.clone(),
        policy.timezone,
    ));

    match state.service_factory.payment_service() {
        Some(payments) => {
            let admin_email = config.mailer.as_ref().and_then(|m| m.admin_email.as_deref());
            let notifier = notifier_for(state.service_factory.notification_service(), admin_email);
            let desk = ReservationDesk::new(
                store,
                payments,
                notifier,
                policy,
                Pricing::from_config(&config.booking),
            );
            router = router.merge(cabinet_booking::routes(Arc::new(desk)));
            info!("Checkout and webhook routes mounted");
        }
        None => warn!("No payment service available; checkout and webhook routes are not mounted"),
    }

    #[allow(unused_mut)] // only mutated with openapi
    let mut app = Router::new().nest("/api", router);

    #[cfg(feature = "openapi")]
    {
        app = app.merge(swagger_ui());
    }

    Ok(app)
}

#[cfg(feature = "openapi")]
fn swagger_ui() -> utoipa_swagger_ui::SwaggerUi {
    use cabinet_booking::doc::BookingApiDoc;
    use cabinet_calendar::doc::CalendarApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    #[derive(OpenApi)]
    #[openapi(
        info(
            title = "Cabinet Booking API",
            version = "0.1.0",
            description = "Appointment checkout, payment confirmation and calendar feed"
        ),
        servers((url = "/api", description = "Main API Prefix")),
    )]
    struct ApiDoc;

    let mut openapi_doc = ApiDoc::openapi();
    openapi_doc.merge(BookingApiDoc::openapi());
    openapi_doc.merge(CalendarApiDoc::openapi());
    info!("Adding Swagger UI at /api/docs");

    SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc)
}
