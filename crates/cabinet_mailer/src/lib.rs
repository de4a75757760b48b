//! SMTP implementation of [`cabinet_common::services::NotificationService`].

pub mod error;
pub mod service;

pub use error::MailerError;
pub use service::SmtpNotificationService;
