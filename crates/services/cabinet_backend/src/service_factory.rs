// --- File: crates/services/cabinet_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Builds the external collaborators selected by cargo features and the
//! `use_*` runtime flags, and hands them out behind `Error = BoxedError`.
use cabinet_config::AppConfig;
use std::sync::Arc;
#[allow(unused_imports)] // used only by certain features
use {
    cabinet_common::is_feature_enabled,
    cabinet_common::services::{
        BoxedError, BoxedNotificationService, BoxedPaymentService, NotificationService,
        PaymentService, ServiceFactory,
    },
    tracing::{error, info, warn},
};

#[cfg(feature = "stripe")]
use cabinet_stripe::StripePaymentService;

#[cfg(feature = "mailer")]
use cabinet_mailer::SmtpNotificationService;

/// Collaborators for the running backend.
///
/// A service that is disabled, unconfigured or fails to initialize is simply
/// absent; callers decide what that means for their routes.
pub struct CabinetServiceFactory {
    payment_service: Option<Arc<dyn PaymentService<Error = BoxedError>>>,
    notification_service: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
}

impl CabinetServiceFactory {
    /// Create a new service factory.
    #[allow(unused_variables)]
    pub fn new(config: &AppConfig) -> Self {
        #[allow(unused_mut)]
        let mut factory = Self {
            payment_service: None,
            notification_service: None,
        };

        #[cfg(feature = "stripe")]
        {
            if is_feature_enabled(config.use_stripe, config.stripe.as_ref()) {
                info!("Initializing Stripe payment service...");
                match config.stripe.as_ref().map(StripePaymentService::new) {
                    Some(Ok(service)) => {
                        factory.payment_service = Some(Arc::new(BoxedPaymentService(service)));
                        info!("Stripe payment service initialized.");
                    }
                    Some(Err(e)) => error!("Stripe payment service disabled: {}", e),
                    None => {}
                }
            } else if config.use_stripe {
                warn!("use_stripe is set but the [stripe] section is missing");
            }
        }

        #[cfg(feature = "mailer")]
        {
            if is_feature_enabled(config.use_mailer, config.mailer.as_ref()) {
                info!("Initializing SMTP notification service...");
                let mailer = config.mailer.as_ref().map(SmtpNotificationService::new);
                match mailer {
                    Some(Ok(service)) => {
                        factory.notification_service =
                            Some(Arc::new(BoxedNotificationService(service)));
                        info!("SMTP notification service initialized.");
                    }
                    Some(Err(e)) => error!("SMTP notification service disabled: {}", e),
                    None => {}
                }
            }
        }

        factory
    }

    /// Assemble a factory from ready-made services.
    pub fn from_services(
        payment_service: Option<Arc<dyn PaymentService<Error = BoxedError>>>,
        notification_service: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
    ) -> Self {
        Self {
            payment_service,
            notification_service,
        }
    }
}

impl ServiceFactory for CabinetServiceFactory {
    fn payment_service(&self) -> Option<Arc<dyn PaymentService<Error = BoxedError>>> {
        self.payment_service.clone()
    }

    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>> {
        self.notification_service.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_enabled_by_default() {
        let factory = CabinetServiceFactory::new(&AppConfig::default());
        assert!(factory.payment_service().is_none());
        assert!(factory.notification_service().is_none());
    }

    #[cfg(feature = "stripe")]
    #[test]
    fn test_stripe_without_secret_key_stays_disabled() {
        let config = AppConfig {
            use_stripe: true,
            stripe: Some(cabinet_config::StripeConfig {
                success_url: "http://localhost/success".to_string(),
                cancel_url: "http://localhost/cancel".to_string(),
                secret_key: None,
                webhook_secret: Some("whsec_test".to_string()),
                signature_tolerance_secs: 300,
            }),
            ..AppConfig::default()
        };

        let factory = CabinetServiceFactory::new(&config);
        assert!(factory.payment_service().is_none());
    }

    #[cfg(feature = "stripe")]
    #[test]
    fn test_stripe_requires_runtime_flag() {
        let config = AppConfig {
            use_stripe: false,
            stripe: Some(cabinet_config::StripeConfig {
                success_url: "http://localhost/success".to_string(),
                cancel_url: "http://localhost/cancel".to_string(),
                secret_key: Some("sk_test_123".to_string()),
                webhook_secret: Some("whsec_test".to_string()),
                signature_tolerance_secs: 300,
            }),
            ..AppConfig::default()
        };

        let factory = CabinetServiceFactory::new(&config);
        assert!(factory.payment_service().is_none());
    }
}
