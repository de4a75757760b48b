//! Repository trait for reservation storage
//!
//! Object safe so the backend can hold an `Arc<dyn ReservationRepository>`
//! and tests can swap in the in-memory implementation.

use crate::error::DbError;
use cabinet_common::services::BoxFuture;
use cabinet_common::Reservation;

/// Durable, ordered collection of confirmed reservations.
pub trait ReservationRepository: Send + Sync {
    /// Load every stored reservation, in insertion order.
    fn snapshot(&self) -> BoxFuture<'_, Vec<Reservation>, DbError>;

    /// Persist one more reservation.
    ///
    /// The write is all-or-nothing: after an error the stored list is
    /// unchanged. Fails with [`DbError::Duplicate`] when a reservation with the
    /// same `date_time` string is already stored.
    fn append(&self, reservation: Reservation) -> BoxFuture<'_, (), DbError>;
}
