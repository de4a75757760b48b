//! SMTP email delivery using Lettre.

use crate::error::MailerError;
use cabinet_common::services::{BoxFuture, NotificationResult, NotificationService};
use cabinet_config::{MailerConfig, SECRET_MARKER};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

/// Sends mail through an authenticated SMTP relay (STARTTLS/TLS).
#[derive(Clone)]
pub struct SmtpNotificationService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotificationService {
    /// Build the transport from the `[mailer]` section.
    ///
    /// The sender is `mailer.from`, or the SMTP username when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is empty, the password was never
    /// resolved, or the sender is not a valid address.
    pub fn new(config: &MailerConfig) -> Result<Self, MailerError> {
        if config.smtp_host.trim().is_empty() {
            return Err(MailerError::ConfigError("smtp_host is empty".to_string()));
        }
        if config.smtp_password == SECRET_MARKER {
            return Err(MailerError::ConfigError(
                "smtp_password was not resolved from the environment".to_string(),
            ));
        }

        let sender = config
            .from
            .clone()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| config.smtp_username.clone());
        let from = parse_mailbox(&sender)?;

        let credentials = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| MailerError::ConfigError(format!("SMTP relay error: {e}")))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        debug!("SMTP relay {}:{} configured", config.smtp_host, config.smtp_port);
        Ok(Self { transport, from })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailerError> {
    address.trim().parse().map_err(|e: lettre::address::AddressError| MailerError::AddressError {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Assemble a single-part message.
pub fn build_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    body: &str,
    is_html: bool,
) -> Result<Message, MailerError> {
    let content_type = if is_html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };

    Message::builder()
        .from(from.clone())
        .to(parse_mailbox(to)?)
        .subject(subject)
        .header(content_type)
        .body(body.to_string())
        .map_err(|e| MailerError::BuildError(e.to_string()))
}

impl NotificationService for SmtpNotificationService {
    type Error = MailerError;

    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        is_html: bool,
    ) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let message = build_message(&self.from, to, subject, body, is_html);
        let to = to.to_string();
        let subject = subject.to_string();

        Box::pin(async move {
            let response = self
                .transport
                .send(message?)
                .await
                .map_err(|e| MailerError::TransportError(e.to_string()))?;

            let status = response.code().to_string();
            info!("Email '{}' accepted for {} ({})", subject, to, status);
            Ok(NotificationResult {
                id: response.message().collect::<Vec<_>>().join(" "),
                status,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer_config() -> MailerConfig {
        MailerConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "cabinet@example.com".to_string(),
            smtp_password: "app-password".to_string(),
            from: None,
            admin_email: Some("admin@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_sender_falls_back_to_username() {
        let service = SmtpNotificationService::new(&mailer_config()).unwrap();
        assert_eq!(service.from.email.to_string(), "cabinet@example.com");

        let mut config = mailer_config();
        config.from = Some("Cabinet <noreply@example.com>".to_string());
        let service = SmtpNotificationService::new(&config).unwrap();
        assert_eq!(service.from.email.to_string(), "noreply@example.com");
        assert_eq!(service.from.name.as_deref(), Some("Cabinet"));
    }

    #[tokio::test]
    async fn test_unresolved_password_is_rejected() {
        let mut config = mailer_config();
        config.smtp_password = SECRET_MARKER.to_string();
        assert!(matches!(
            SmtpNotificationService::new(&config),
            Err(MailerError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_host_is_rejected() {
        let mut config = mailer_config();
        config.smtp_host = " ".to_string();
        assert!(SmtpNotificationService::new(&config).is_err());
    }

    #[test]
    fn test_build_message_headers() {
        let from: Mailbox = "cabinet@example.com".parse().unwrap();
        let message = build_message(&from, "admin@example.com", "New reservation", "Type: visio", false).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("To: admin@example.com"));
        assert!(raw.contains("Subject: New reservation"));
        assert!(raw.contains("Content-Type: text/plain"));
        assert!(raw.contains("Type: visio"));
    }

    #[test]
    fn test_invalid_recipient() {
        let from: Mailbox = "cabinet@example.com".parse().unwrap();
        let err = build_message(&from, "not an address", "s", "b", false).unwrap_err();
        assert!(matches!(err, MailerError::AddressError { .. }));
    }
}
