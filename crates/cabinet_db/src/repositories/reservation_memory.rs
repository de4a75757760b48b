//! In-memory implementation of the reservation repository

use crate::error::DbError;
use crate::repository::ReservationRepository;
use cabinet_common::services::BoxFuture;
use cabinet_common::Reservation;
use tokio::sync::RwLock;

/// Process-local reservation store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryReservationRepository {
    reservations: RwLock<Vec<Reservation>>,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing reservations.
    pub fn with_reservations(reservations: Vec<Reservation>) -> Self {
        Self {
            reservations: RwLock::new(reservations),
        }
    }

    pub async fn len(&self) -> usize {
        self.reservations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reservations.read().await.is_empty()
    }
}

impl ReservationRepository for InMemoryReservationRepository {
    fn snapshot(&self) -> BoxFuture<'_, Vec<Reservation>, DbError> {
        Box::pin(async move { Ok(self.reservations.read().await.clone()) })
    }

    fn append(&self, reservation: Reservation) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            let mut reservations = self.reservations.write().await;
            if reservations.iter().any(|r| r.date_time == reservation.date_time) {
                return Err(DbError::Duplicate(reservation.date_time));
            }
            reservations.push(reservation);
            Ok(())
        })
    }
}
