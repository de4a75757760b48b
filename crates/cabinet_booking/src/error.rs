//! Errors surfaced by the checkout path.

use crate::validation::{PolicyError, Rejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cabinet_common::HttpStatusCode;
use cabinet_db::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("payment provider error: {0}")]
    UpstreamPayment(String),

    #[error("storage error: {0}")]
    Storage(#[from] DbError),

    #[error("booking policy misconfigured: {0}")]
    Policy(#[from] PolicyError),
}

impl BookingError {
    /// Reason code used in the `error` field of the response body.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::Rejected(rejection) => rejection.code(),
            BookingError::UpstreamPayment(_) => "upstream_payment_error",
            BookingError::Storage(_) => "storage_io_error",
            BookingError::Policy(_) => "configuration_error",
        }
    }

    fn public_message(&self) -> String {
        match self {
            BookingError::Rejected(rejection) => rejection.to_string(),
            BookingError::UpstreamPayment(_) => {
                "The payment provider could not create a checkout session".to_string()
            }
            BookingError::Storage(_) => "Reservations are temporarily unavailable".to_string(),
            BookingError::Policy(_) => "Booking is misconfigured".to_string(),
        }
    }
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::Rejected(_) => 400,
            BookingError::UpstreamPayment(_) => 502,
            BookingError::Storage(_) | BookingError::Policy(_) => 500,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "error": self.code(),
            "message": self.public_message(),
        });
        (status, Json(body)).into_response()
    }
}
