//! Failures that stop the backend from starting.

use cabinet_booking::BookingError;
use cabinet_config::ConfigLoadError;
use cabinet_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("reservation store error: {0}")]
    Store(#[from] DbError),

    #[error("booking setup error: {0}")]
    Booking(#[from] BookingError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
