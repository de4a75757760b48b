// --- File: crates/cabinet_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for routes that are not tied to one integration.
///
/// Crates whose errors surface through such routes implement
/// `From<SpecificError> for CabinetError`.
#[derive(Error, Debug)]
pub enum CabinetError {
    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred while reading or writing the reservation store
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Error occurred due to a conflict (e.g., slot already booked)
    #[error("Conflict: {0}")]
    ConflictError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for CabinetError {
    fn status_code(&self) -> u16 {
        match self {
            CabinetError::ConfigError(_) => 500,
            CabinetError::StorageError(_) => 500,
            CabinetError::ConflictError(_) => 409,
        }
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> CabinetError {
    CabinetError::ConfigError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(config_error("x").status_code(), 500);
        assert_eq!(CabinetError::StorageError("disk full".into()).status_code(), 500);
        assert_eq!(CabinetError::ConflictError("taken".into()).status_code(), 409);
    }

    #[test]
    fn test_config_error_message() {
        let err = config_error("store.path is empty");
        assert_eq!(err.to_string(), "Configuration error: store.path is empty");
    }
}
