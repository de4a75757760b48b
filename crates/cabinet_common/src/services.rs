// --- File: crates/cabinet_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! The booking core only talks to these traits; the Stripe and SMTP crates
//! implement them and tests substitute in-process fakes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

impl BoxedError {
    pub fn new<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        BoxedError(Box::new(err))
    }
}

/// A trait for the hosted-checkout payment provider.
pub trait PaymentService: Send + Sync {
    /// Error type returned by payment service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a pending checkout session. `metadata` is echoed back verbatim in
    /// the completion event.
    fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error>;

    /// Authenticate an inbound webhook over the exact bytes received and decode it.
    fn verify_event(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<PaymentEvent, WebhookRejection>;
}

/// A trait for outbound notifications.
pub trait NotificationService: Send + Sync {
    /// Error type returned by notification service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a plain-text or HTML email.
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        is_html: bool,
    ) -> BoxFuture<'_, NotificationResult, Self::Error>;
}

/// A factory handing out the configured collaborators.
pub trait ServiceFactory: Send + Sync {
    /// Get the payment service, if payments are enabled.
    fn payment_service(&self) -> Option<Arc<dyn PaymentService<Error = BoxedError>>>;

    /// Get the notification service, if notifications are enabled.
    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>>;
}

/// Adapts a payment service with its own error type to `Error = BoxedError`,
/// the form handed out by [`ServiceFactory`].
pub struct BoxedPaymentService<S>(pub S);

impl<S: PaymentService> PaymentService for BoxedPaymentService<S> {
    type Error = BoxedError;

    fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error> {
        Box::pin(async move {
            self.0
                .create_checkout_session(request)
                .await
                .map_err(BoxedError::new)
        })
    }

    fn verify_event(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<PaymentEvent, WebhookRejection> {
        self.0.verify_event(payload, signature_header)
    }
}

/// Notification counterpart of [`BoxedPaymentService`].
pub struct BoxedNotificationService<S>(pub S);

impl<S: NotificationService> NotificationService for BoxedNotificationService<S> {
    type Error = BoxedError;

    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        is_html: bool,
    ) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let sending = self.0.send_email(to, subject, body, is_html);
        Box::pin(async move { sending.await.map_err(BoxedError::new) })
    }
}

/// What to charge and what to carry through the checkout round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    pub currency: String,
    /// Line-item label shown on the hosted checkout page.
    pub description: String,
    pub metadata: HashMap<String, String>,
}

/// Represents a created checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionResult {
    pub id: String,
    /// Hosted checkout page, when the provider returns one.
    pub url: Option<String>,
    pub amount: i64,
    pub currency: String,
}

/// A verified, provider-neutral webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    pub event_id: String,
    pub kind: PaymentEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEventKind {
    /// Funds were captured for a checkout session.
    CheckoutCompleted {
        session_id: String,
        metadata: HashMap<String, String>,
    },
    /// Any event the booking core does not act upon.
    Other(String),
}

/// Why an inbound webhook was not accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookRejection {
    /// Missing/invalid signature, stale timestamp or missing secret.
    #[error("webhook signature invalid: {0}")]
    SignatureInvalid(String),
    /// Authentic payload that could not be decoded.
    #[error("webhook payload malformed: {0}")]
    MalformedPayload(String),
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// The ID of the notification, when the transport provides one.
    pub id: String,
    /// The status of the notification.
    pub status: String,
}
