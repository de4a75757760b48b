// --- File: crates/cabinet_booking/src/routes.rs ---

use crate::handlers::{create_checkout_session_handler, webhook_handler, BookingState};
use crate::logic::ReservationDesk;
use axum::{routing::post, Router};
use std::sync::Arc;

/// Creates a router containing the checkout and payment-webhook routes.
pub fn routes(desk: Arc<ReservationDesk>) -> Router {
    let booking_state = Arc::new(BookingState { desk });

    Router::new()
        .route("/create-checkout-session", post(create_checkout_session_handler))
        .route("/webhook", post(webhook_handler))
        .with_state(booking_state)
}
