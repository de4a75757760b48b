// --- File: crates/cabinet_booking/src/handlers.rs ---
use crate::error::BookingError;
use crate::logic::{ConfirmationOutcome, ReservationDesk};
use crate::validation::Rejection;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use cabinet_common::CandidateRequest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

// --- State for Booking Handlers ---
#[derive(Clone)]
pub struct BookingState {
    pub desk: Arc<ReservationDesk>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    /// Same value as `sessionId`, for hosted-checkout redirect scripts.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/create-checkout-session",
    request_body = CandidateRequest,
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 400, description = "Slot rejected (invalid_input, slot_taken, closed_day, too_soon, out_of_window)"),
        (status = 502, description = "Payment provider error"),
        (status = 500, description = "Reservation store unavailable")
    ),
    tag = "Booking"
))]
pub async fn create_checkout_session_handler(
    State(state): State<Arc<BookingState>>,
    payload: Result<Json<CandidateRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, BookingError> {
    let Json(candidate) = payload
        .map_err(|e| BookingError::Rejected(Rejection::InvalidInput(e.body_text())))?;

    let session = state.desk.initiate_checkout(&candidate).await?;
    Ok(Json(CheckoutResponse {
        id: session.session_id.clone(),
        session_id: session.session_id,
        url: session.url,
    }))
}

/// Receives payment events. The body is taken as raw bytes so the signature
/// is checked over exactly what was sent.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/webhook",
    request_body(content = String, description = "Raw signed event payload", content_type = "application/json"),
    params(("Stripe-Signature" = String, Header, description = "Provider signature header")),
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Signature invalid")
    ),
    tag = "Booking Webhooks"
))]
pub async fn webhook_handler(
    State(state): State<Arc<BookingState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match state.desk.handle_webhook(&body, signature).await {
        Ok(outcome) => {
            if let ConfirmationOutcome::Dropped(reason) = &outcome {
                info!("Payment event acknowledged without reservation ({})", reason.code());
            }
            (StatusCode::OK, Json(json!({ "received": true }))).into_response()
        }
        Err(rejection) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "signature_invalid",
                "message": rejection.to_string(),
            })),
        )
            .into_response(),
    }
}
