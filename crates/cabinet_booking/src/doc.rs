// --- File: crates/cabinet_booking/src/doc.rs ---
#![cfg(feature = "openapi")]
use crate::handlers::CheckoutResponse;
use cabinet_common::CandidateRequest;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_checkout_session_handler,
        crate::handlers::webhook_handler
    ),
    components(schemas(CandidateRequest, CheckoutResponse)),
    tags(
        (name = "Booking", description = "Appointment checkout"),
        (name = "Booking Webhooks", description = "Signed payment confirmations")
    )
)]
pub struct BookingApiDoc;
