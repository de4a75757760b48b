// --- File: crates/cabinet_booking/src/logic.rs ---
//! Checkout initiation and payment confirmation.
//!
//! [`ReservationDesk`] owns the collaborators (store, payment provider,
//! notifier) and the booking policy. Checkout validates against the current
//! snapshot and opens a payment session carrying the candidate as metadata;
//! nothing is persisted and no slot is held. Confirmation re-validates under
//! the commit lock, so of two paid sessions for one slot only the first is
//! stored.

use crate::error::BookingError;
use crate::notifier::{dispatch, ReservationNotifier};
use crate::validation::{validate, BookingPolicy, Rejection};
use cabinet_common::services::{
    BoxedError, CheckoutSessionRequest, PaymentEventKind, PaymentService, WebhookRejection,
};
use cabinet_common::{CandidateRequest, Reservation, ServiceType};
use cabinet_config::BookingConfig;
use cabinet_db::{DbError, ReservationRepository};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Metadata key carrying the canonical slot through the payment round-trip.
pub const METADATA_DATE_TIME: &str = "dateTime";
/// Metadata key carrying the service type through the payment round-trip.
pub const METADATA_SERVICE_TYPE: &str = "serviceType";

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Price and label of a consultation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pricing {
    pub unit_amount: i64,
    pub currency: String,
    pub product_label: String,
}

impl Pricing {
    pub fn from_config(config: &BookingConfig) -> Self {
        Self {
            unit_amount: config.unit_amount,
            currency: config.currency.clone(),
            product_label: config.product_label.clone(),
        }
    }

    /// Line-item label shown on the checkout page, e.g. `Consultation - visio`.
    pub fn line_item(&self, service_type: ServiceType) -> String {
        format!("{} - {}", self.product_label, service_type)
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::from_config(&BookingConfig::default())
    }
}

/// A payment session opened for a validated candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: Option<String>,
}

/// Why a verified confirmation event did not produce a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    MalformedMetadata(String),
    Rejected(Rejection),
    StorageFailure(String),
}

impl DropReason {
    pub fn code(&self) -> &'static str {
        match self {
            DropReason::MalformedMetadata(_) => "malformed_metadata",
            DropReason::Rejected(rejection) => rejection.code(),
            DropReason::StorageFailure(_) => "storage_io_error",
        }
    }
}

/// What happened to a verified webhook event. Every variant is acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Confirmed(Reservation),
    /// Event type the desk does not act upon.
    Ignored(String),
    Dropped(DropReason),
}

impl ConfirmationOutcome {
    pub fn code(&self) -> &'static str {
        match self {
            ConfirmationOutcome::Confirmed(_) => "confirmed",
            ConfirmationOutcome::Ignored(_) => "ignored",
            ConfirmationOutcome::Dropped(reason) => reason.code(),
        }
    }
}

pub struct ReservationDesk {
    store: Arc<dyn ReservationRepository>,
    payments: Arc<dyn PaymentService<Error = BoxedError>>,
    notifier: Arc<dyn ReservationNotifier>,
    policy: BookingPolicy,
    pricing: Pricing,
    clock: Clock,
    commit_lock: Mutex<()>,
}

impl ReservationDesk {
    pub fn new(
        store: Arc<dyn ReservationRepository>,
        payments: Arc<dyn PaymentService<Error = BoxedError>>,
        notifier: Arc<dyn ReservationNotifier>,
        policy: BookingPolicy,
        pricing: Pricing,
    ) -> Self {
        Self {
            store,
            payments,
            notifier,
            policy,
            pricing,
            clock: Arc::new(Utc::now),
            commit_lock: Mutex::new(()),
        }
    }

    /// Build the desk from the `booking` configuration section.
    pub fn from_config(
        config: &BookingConfig,
        store: Arc<dyn ReservationRepository>,
        payments: Arc<dyn PaymentService<Error = BoxedError>>,
        notifier: Arc<dyn ReservationNotifier>,
    ) -> Result<Self, BookingError> {
        let policy = BookingPolicy::from_config(config)?;
        Ok(Self::new(store, payments, notifier, policy, Pricing::from_config(config)))
    }

    /// Replace the wall clock, for tests pinned to a fixed instant.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<dyn ReservationRepository> {
        &self.store
    }

    /// Validate `candidate` and open a payment session for it.
    pub async fn initiate_checkout(
        &self,
        candidate: &CandidateRequest,
    ) -> Result<CheckoutSession, BookingError> {
        let snapshot = self.store.snapshot().await.map_err(|e| {
            error!("Failed to read reservations for checkout: {}", e);
            BookingError::Storage(e)
        })?;

        let accepted = validate(candidate, &snapshot, (self.clock)(), &self.policy).map_err(|r| {
            info!("Checkout rejected ({}): {:?}", r.code(), candidate);
            BookingError::Rejected(r)
        })?;

        let mut metadata = HashMap::new();
        metadata.insert(METADATA_DATE_TIME.to_string(), accepted.slot.canonical());
        metadata.insert(
            METADATA_SERVICE_TYPE.to_string(),
            accepted.service_type.as_str().to_string(),
        );

        let request = CheckoutSessionRequest {
            amount: self.pricing.unit_amount,
            currency: self.pricing.currency.clone(),
            description: self.pricing.line_item(accepted.service_type),
            metadata,
        };

        let session = self
            .payments
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                error!("Payment provider refused checkout session: {}", e);
                BookingError::UpstreamPayment(e.to_string())
            })?;

        info!(
            "Checkout session {} opened for {} {}",
            session.id, accepted.service_type, accepted.slot
        );
        Ok(CheckoutSession {
            session_id: session.id,
            url: session.url,
        })
    }

    /// Verify an inbound payment event over its raw bytes and act on it.
    ///
    /// Only an authentication failure is returned as an error; every other
    /// outcome, including drops, is meant to be acknowledged.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<ConfirmationOutcome, WebhookRejection> {
        let event = match self.payments.verify_event(payload, signature_header) {
            Ok(event) => event,
            Err(WebhookRejection::MalformedPayload(reason)) => {
                warn!("Dropping undecodable payment event: {}", reason);
                return Ok(ConfirmationOutcome::Dropped(DropReason::MalformedMetadata(reason)));
            }
            Err(rejection) => {
                warn!("Rejecting payment event: {}", rejection);
                return Err(rejection);
            }
        };

        match event.kind {
            PaymentEventKind::CheckoutCompleted { session_id, metadata } => {
                debug!("Payment event {} completes session {}", event.event_id, session_id);
                Ok(self.confirm(&session_id, &metadata).await)
            }
            PaymentEventKind::Other(kind) => {
                debug!("Ignoring payment event {} of type {}", event.event_id, kind);
                Ok(ConfirmationOutcome::Ignored(kind))
            }
        }
    }

    /// Commit the reservation paid for by `session_id`, if the slot is still free.
    pub async fn confirm(
        &self,
        session_id: &str,
        metadata: &HashMap<String, String>,
    ) -> ConfirmationOutcome {
        let candidate = match candidate_from_metadata(metadata) {
            Ok(candidate) => candidate,
            Err(reason) => {
                warn!("Session {} has malformed metadata: {}", session_id, reason);
                return ConfirmationOutcome::Dropped(DropReason::MalformedMetadata(reason));
            }
        };

        let reservation = {
            let _guard = self.commit_lock.lock().await;

            let snapshot = match self.store.snapshot().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    error!("Session {} paid but reservations unreadable: {}", session_id, e);
                    return ConfirmationOutcome::Dropped(DropReason::StorageFailure(e.to_string()));
                }
            };

            let now = (self.clock)();
            let accepted = match validate(&candidate, &snapshot, now, &self.policy) {
                Ok(accepted) => accepted,
                Err(rejection) => {
                    warn!(
                        "Session {} paid for {:?} but was rejected ({}); manual refund required",
                        session_id,
                        candidate.date_time,
                        rejection.code()
                    );
                    return ConfirmationOutcome::Dropped(DropReason::Rejected(rejection));
                }
            };

            let reservation = Reservation {
                date_time: accepted.slot.canonical(),
                service_type: accepted.service_type,
                payment_session_id: Some(session_id.to_string()),
                created_at: now,
            };

            match self.store.append(reservation.clone()).await {
                Ok(()) => reservation,
                Err(DbError::Duplicate(slot)) => {
                    warn!("Session {} lost slot {} to a concurrent booking", session_id, slot);
                    return ConfirmationOutcome::Dropped(DropReason::Rejected(Rejection::SlotTaken));
                }
                Err(e) => {
                    error!("Session {} paid but reservation not stored: {}", session_id, e);
                    return ConfirmationOutcome::Dropped(DropReason::StorageFailure(e.to_string()));
                }
            }
        };

        info!(
            "Reservation confirmed: {} {} (session {})",
            reservation.service_type, reservation.date_time, session_id
        );
        dispatch(self.notifier.clone(), reservation.clone());
        ConfirmationOutcome::Confirmed(reservation)
    }
}

fn candidate_from_metadata(metadata: &HashMap<String, String>) -> Result<CandidateRequest, String> {
    let date_time = metadata
        .get(METADATA_DATE_TIME)
        .ok_or_else(|| format!("missing {}", METADATA_DATE_TIME))?;
    let service_type = metadata
        .get(METADATA_SERVICE_TYPE)
        .ok_or_else(|| format!("missing {}", METADATA_SERVICE_TYPE))?;
    Ok(CandidateRequest::new(date_time.as_str(), service_type.as_str()))
}
