//! Error types for the reservation store

use cabinet_common::{config_error, CabinetError};
use thiserror::Error;

/// Errors that can occur when reading or writing reservations
#[derive(Debug, Error)]
pub enum DbError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be (de)serialized
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from SQLx
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error executing a query
    #[error("Query error: {0}")]
    QueryError(String),

    /// A reservation for this slot is already stored
    #[error("A reservation already exists for slot {0}")]
    Duplicate(String),

    /// Error with the store configuration
    #[error("Storage configuration error: {0}")]
    ConfigError(String),

    /// Stored data could not be interpreted
    #[error("Corrupt stored data: {0}")]
    Corrupt(String),
}

impl From<DbError> for CabinetError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(slot) => CabinetError::ConflictError(format!("slot {} already booked", slot)),
            DbError::ConfigError(msg) => config_error(msg),
            other => CabinetError::StorageError(other.to_string()),
        }
    }
}
