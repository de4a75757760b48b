//! Reservation repository implementations
//!
//! Each backend implements [`crate::ReservationRepository`]; pick one with
//! [`crate::open_reservation_store`].

mod reservation_json;
mod reservation_memory;
#[cfg(feature = "sqlite")]
mod reservation_sql;

pub use reservation_json::JsonFileReservationRepository;
pub use reservation_memory::InMemoryReservationRepository;
#[cfg(feature = "sqlite")]
pub use reservation_sql::SqlReservationRepository;

#[cfg(all(test, feature = "sqlite"))]
mod reservation_sql_test;
