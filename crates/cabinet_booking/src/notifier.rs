//! Post-commit notification of confirmed reservations.
//!
//! The desk hands each committed reservation to a [`ReservationNotifier`]
//! on a detached task. Failures are logged and never reach the commit path.

use cabinet_common::services::{BoxFuture, BoxedError, NotificationService};
use cabinet_common::Reservation;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub trait ReservationNotifier: Send + Sync {
    fn reservation_confirmed(&self, reservation: Reservation) -> BoxFuture<'_, (), BoxedError>;
}

/// Emails the practitioner about every new reservation.
pub struct AdminEmailNotifier {
    mailer: Arc<dyn NotificationService<Error = BoxedError>>,
    admin_email: String,
}

impl AdminEmailNotifier {
    pub fn new(mailer: Arc<dyn NotificationService<Error = BoxedError>>, admin_email: impl Into<String>) -> Self {
        Self {
            mailer,
            admin_email: admin_email.into(),
        }
    }
}

pub fn admin_email_body(reservation: &Reservation) -> String {
    format!(
        "A new reservation has been recorded.\n\nType: {}\nDate: {}\nSession: {}",
        reservation.service_type,
        reservation.date_time,
        reservation.payment_session_id.as_deref().unwrap_or("-"),
    )
}

impl ReservationNotifier for AdminEmailNotifier {
    fn reservation_confirmed(&self, reservation: Reservation) -> BoxFuture<'_, (), BoxedError> {
        Box::pin(async move {
            let body = admin_email_body(&reservation);
            let result = self
                .mailer
                .send_email(&self.admin_email, "New reservation", &body, false)
                .await?;
            info!(
                "Admin notified of reservation {} ({})",
                reservation.date_time, result.status
            );
            Ok(())
        })
    }
}

/// Used when no admin address or mail transport is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl ReservationNotifier for NoopNotifier {
    fn reservation_confirmed(&self, reservation: Reservation) -> BoxFuture<'_, (), BoxedError> {
        Box::pin(async move {
            debug!("Notifications disabled, skipping {}", reservation.date_time);
            Ok(())
        })
    }
}

/// Pick the notifier for the configured collaborators.
pub fn notifier_for(
    mailer: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
    admin_email: Option<&str>,
) -> Arc<dyn ReservationNotifier> {
    match (mailer, admin_email.map(str::trim).filter(|a| !a.is_empty())) {
        (Some(mailer), Some(admin)) => Arc::new(AdminEmailNotifier::new(mailer, admin)),
        _ => Arc::new(NoopNotifier),
    }
}

/// Fire-and-forget delivery on a detached task.
pub fn dispatch(notifier: Arc<dyn ReservationNotifier>, reservation: Reservation) -> JoinHandle<()> {
    tokio::spawn(async move {
        let date_time = reservation.date_time.clone();
        if let Err(e) = notifier.reservation_confirmed(reservation).await {
            error!("Notification failure for reservation {}: {}", date_time, e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabinet_common::services::NotificationResult;
    use cabinet_common::ServiceType;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    impl NotificationService for RecordingMailer {
        type Error = BoxedError;

        fn send_email(
            &self,
            to: &str,
            subject: &str,
            body: &str,
            _is_html: bool,
        ) -> BoxFuture<'_, NotificationResult, Self::Error> {
            let to = to.to_string();
            let subject = subject.to_string();
            let body = body.to_string();
            Box::pin(async move {
                if self.fail {
                    return Err(BoxedError::new(std::io::Error::other("smtp down")));
                }
                self.sent.lock().unwrap().push((to, subject, body));
                Ok(NotificationResult {
                    id: "1".into(),
                    status: "sent".into(),
                })
            })
        }
    }

    fn reservation() -> Reservation {
        Reservation {
            date_time: "2025-08-15T14:30".into(),
            service_type: ServiceType::Cabinet,
            payment_session_id: Some("cs_test_1".into()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn admin_email_carries_reservation_fields() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = AdminEmailNotifier::new(mailer.clone(), "admin@example.com");

        notifier.reservation_confirmed(reservation()).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (to, subject, body) = &sent[0];
        assert_eq!(to, "admin@example.com");
        assert_eq!(subject, "New reservation");
        assert!(body.contains("Type: cabinet"));
        assert!(body.contains("Date: 2025-08-15T14:30"));
        assert!(body.contains("Session: cs_test_1"));
    }

    #[tokio::test]
    async fn dispatch_swallows_failures() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let mailer: Arc<dyn NotificationService<Error = BoxedError>> = mailer;
        let notifier = notifier_for(Some(mailer), Some("admin@example.com"));
        dispatch(notifier, reservation()).await.unwrap();
    }

    #[tokio::test]
    async fn missing_admin_address_disables_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let shared: Arc<dyn NotificationService<Error = BoxedError>> = mailer.clone();
        for admin in [None, Some("  ")] {
            let notifier = notifier_for(Some(shared.clone()), admin);
            notifier.reservation_confirmed(reservation()).await.unwrap();
        }
        assert!(mailer.sent.lock().unwrap().is_empty());
    }
}
