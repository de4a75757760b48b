// --- File: crates/cabinet_stripe/src/service.rs ---
use crate::error::StripeError;
use crate::logic::{
    create_checkout_session, parse_event, to_payment_event, verify_stripe_signature,
    STRIPE_API_BASE,
};
use cabinet_common::services::{
    BoxFuture, CheckoutSessionRequest, CheckoutSessionResult, PaymentEvent, PaymentService,
    WebhookRejection,
};
use cabinet_common::HTTP_CLIENT;
use cabinet_config::{StripeConfig, SECRET_MARKER};
use chrono::Utc;
use tracing::warn;

/// Stripe payment service implementation
pub struct StripePaymentService {
    config: StripeConfig,
    secret_key: String,
    webhook_secret: Option<String>,
    api_base: String,
    client: reqwest::Client,
}

fn usable_secret(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && *s != SECRET_MARKER)
        .map(str::to_string)
}

impl StripePaymentService {
    /// Create a Stripe payment service from the `[stripe]` section.
    ///
    /// The API secret key is required. A missing webhook secret is allowed
    /// but makes every webhook fail verification.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let secret_key = usable_secret(config.secret_key.as_ref())
            .ok_or_else(|| StripeError::ConfigError("secret_key is not set".to_string()))?;
        let webhook_secret = usable_secret(config.webhook_secret.as_ref());
        if webhook_secret.is_none() {
            warn!("Stripe webhook secret not configured; webhooks will be rejected");
        }

        Ok(Self {
            config: config.clone(),
            secret_key,
            webhook_secret,
            api_base: STRIPE_API_BASE.to_string(),
            client: HTTP_CLIENT.clone(),
        })
    }

    /// Point the service at another API base URL (e.g. a local stub).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

impl PaymentService for StripePaymentService {
    type Error = StripeError;

    fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error> {
        Box::pin(async move {
            create_checkout_session(
                &self.client,
                &self.api_base,
                &self.secret_key,
                &self.config,
                request,
            )
            .await
        })
    }

    fn verify_event(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<PaymentEvent, WebhookRejection> {
        let secret = self.webhook_secret.as_deref().ok_or_else(|| {
            WebhookRejection::SignatureInvalid("webhook secret not configured".to_string())
        })?;

        verify_stripe_signature(
            payload,
            signature_header,
            secret,
            self.config.signature_tolerance_secs,
            Utc::now().timestamp(),
        )
        .map_err(|e| WebhookRejection::SignatureInvalid(e.to_string()))?;

        let event =
            parse_event(payload).map_err(|e| WebhookRejection::MalformedPayload(e.to_string()))?;
        to_payment_event(event).map_err(|e| WebhookRejection::MalformedPayload(e.to_string()))
    }
}
