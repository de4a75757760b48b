// --- File: crates/cabinet_stripe/src/logic.rs ---
use crate::error::StripeError;
use cabinet_common::services::{
    CheckoutSessionRequest, CheckoutSessionResult, PaymentEvent, PaymentEventKind,
};
use cabinet_config::StripeConfig;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

pub const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Event types that mean the customer has paid.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
pub const CHECKOUT_ASYNC_PAYMENT_SUCCEEDED: &str = "checkout.session.async_payment_succeeded";

type HmacSha256 = Hmac<Sha256>;

// --- Data Structures ---

#[derive(Deserialize, Debug)]
struct StripeCheckoutSessionApiResponse {
    id: String,
    url: Option<String>,
}

/// Represents the `data` field within a Stripe Event.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEventData {
    /// Shape depends on the event type.
    pub object: serde_json::Value,
}

/// Represents the outer Stripe Event object.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEvent {
    pub id: String,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub livemode: bool,
    #[serde(rename = "type")]
    pub event_type: String, // e.g., "checkout.session.completed"
    pub data: StripeEventData,
}

/// The fields of `data.object` used for checkout-session events.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeCheckoutSessionObject {
    pub id: String,                // Checkout Session ID (cs_...)
    pub amount_total: Option<i64>, // Total amount in cents
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    pub payment_status: Option<String>, // "paid", "unpaid", "no_payment_required"
    pub status: Option<String>,         // "open", "complete", "expired"
}

// --- Signature Verification ---

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`, as Stripe computes it.
pub fn compute_signature(secret: &str, timestamp: &str, payload: &[u8]) -> Result<String, StripeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        StripeError::WebhookSignatureError("Invalid webhook secret format for HMAC".to_string())
    })?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a `Stripe-Signature` header value for `payload`.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, StripeError> {
    let t = timestamp.to_string();
    let v1 = compute_signature(secret, &t, payload)?;
    Ok(format!("t={},v1={}", t, v1))
}

/// Verifies the signature of an incoming Stripe webhook request.
///
/// The HMAC is computed over the raw bytes exactly as received. Every `v1`
/// entry in the header is tried. When `tolerance_secs` is positive, a
/// timestamp further than that from `now_unix` is rejected.
pub fn verify_stripe_signature(
    payload_bytes: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
    now_unix: i64,
) -> Result<(), StripeError> {
    let sig_header_value = sig_header.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing Stripe-Signature header".to_string())
    })?;

    let mut timestamp_str: Option<&str> = None;
    let mut v1_signatures_hex: Vec<&str> = Vec::new();

    for item in sig_header_value.split(',') {
        if let Some((key, value)) = item.trim().split_once('=') {
            match key {
                "t" => timestamp_str = Some(value),
                "v1" => v1_signatures_hex.push(value),
                _ => {} // v0 and unknown schemes are ignored
            }
        }
    }

    let timestamp_str = timestamp_str.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing timestamp 't' in Stripe-Signature".to_string())
    })?;
    let parsed_timestamp = timestamp_str.parse::<i64>().map_err(|_| {
        StripeError::WebhookSignatureError("Invalid timestamp format in Stripe-Signature".to_string())
    })?;

    if v1_signatures_hex.is_empty() {
        return Err(StripeError::WebhookSignatureError(
            "Missing v1 signature in Stripe-Signature".to_string(),
        ));
    }

    if tolerance_secs > 0 && now_unix.abs_diff(parsed_timestamp) > tolerance_secs.unsigned_abs() {
        warn!(
            "Stripe webhook timestamp outside tolerance. Current: {}, Event: {}",
            now_unix, parsed_timestamp
        );
        return Err(StripeError::WebhookSignatureError(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let calculated_signature_hex = compute_signature(secret, timestamp_str, payload_bytes)?;

    if v1_signatures_hex
        .iter()
        .any(|provided| constant_time_eq(calculated_signature_hex.as_bytes(), provided.as_bytes()))
    {
        return Ok(());
    }

    debug!("Stripe signature mismatch for timestamp {}", parsed_timestamp);
    Err(StripeError::WebhookSignatureError("Signature mismatch".to_string()))
}

/// Helper for constant-time string comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

// --- Event Decoding ---

pub fn parse_event(payload_bytes: &[u8]) -> Result<StripeEvent, StripeError> {
    Ok(serde_json::from_slice(payload_bytes)?)
}

/// Map a verified Stripe event onto the provider-neutral [`PaymentEvent`].
///
/// `checkout.session.completed` with `payment_status == "unpaid"` (delayed
/// payment methods) is not a completed payment; its
/// `async_payment_succeeded` follow-up is.
pub fn to_payment_event(event: StripeEvent) -> Result<PaymentEvent, StripeError> {
    info!("Processing Stripe event {} of type {}", event.id, event.event_type);

    let completed = match event.event_type.as_str() {
        CHECKOUT_COMPLETED | CHECKOUT_ASYNC_PAYMENT_SUCCEEDED => {
            let session: StripeCheckoutSessionObject = serde_json::from_value(event.data.object)
                .map_err(|e| {
                    StripeError::WebhookProcessingError(format!(
                        "Failed to parse checkout session object: {}",
                        e
                    ))
                })?;
            if event.event_type == CHECKOUT_COMPLETED
                && session.payment_status.as_deref() == Some("unpaid")
            {
                info!("Checkout Session {} completed but not yet paid", session.id);
                None
            } else {
                Some(session)
            }
        }
        _ => None,
    };

    let kind = match completed {
        Some(session) => PaymentEventKind::CheckoutCompleted {
            session_id: session.id,
            metadata: session.metadata.unwrap_or_default(),
        },
        None => PaymentEventKind::Other(event.event_type),
    };

    Ok(PaymentEvent {
        event_id: event.id,
        kind,
    })
}

// --- Checkout Sessions ---

/// Form body for `POST /v1/checkout/sessions`.
pub fn checkout_form(
    stripe_config: &StripeConfig,
    request: &CheckoutSessionRequest,
) -> Vec<(String, String)> {
    let mut form_body: Vec<(String, String)> = vec![
        ("payment_method_types[]".to_string(), "card".to_string()),
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), stripe_config.success_url.clone()),
        ("cancel_url".to_string(), stripe_config.cancel_url.clone()),
        (
            "line_items[0][price_data][currency]".to_string(),
            request.currency.to_lowercase(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            request.description.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            request.amount.to_string(),
        ),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
    ];

    let mut keys: Vec<&String> = request.metadata.keys().collect();
    keys.sort();
    for key in keys {
        form_body.push((format!("metadata[{}]", key), request.metadata[key].clone()));
    }
    form_body
}

/// Create a hosted Checkout Session.
pub async fn create_checkout_session(
    client: &reqwest::Client,
    api_base: &str,
    secret_key: &str,
    stripe_config: &StripeConfig,
    request: CheckoutSessionRequest,
) -> Result<CheckoutSessionResult, StripeError> {
    let form_body = checkout_form(stripe_config, &request);
    let api_url = format!("{}/checkout/sessions", api_base.trim_end_matches('/'));

    info!("[Stripe Logic] Creating Checkout Session '{}'", request.description);

    let response = client
        .post(&api_url)
        .basic_auth(secret_key, None::<&str>)
        .form(&form_body)
        .send()
        .await?;

    let status = response.status();
    let body_text = response.text().await?;

    if status.is_success() {
        let stripe_response: StripeCheckoutSessionApiResponse = serde_json::from_str(&body_text)?;
        info!(
            "[Stripe Logic] Stripe Checkout Session {} created",
            stripe_response.id
        );
        Ok(CheckoutSessionResult {
            id: stripe_response.id,
            url: stripe_response.url,
            amount: request.amount,
            currency: request.currency,
        })
    } else {
        let error_message = match serde_json::from_str::<serde_json::Value>(&body_text) {
            Ok(json_body) => json_body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or(&body_text)
                .to_string(),
            Err(_) => body_text,
        };
        warn!(
            "[Stripe Logic] Stripe API request failed with HTTP status: {}. Message: {}",
            status, error_message
        );
        Err(StripeError::ApiError {
            status_code: status.as_u16(),
            message: error_message,
        })
    }
}
