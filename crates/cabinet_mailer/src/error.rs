use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Mailer configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid email address '{address}': {reason}")]
    AddressError { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    BuildError(String),

    #[error("SMTP delivery failed: {0}")]
    TransportError(String),
}
