//! Reservation storage for the cabinet booking service
//!
//! The booking core sees the store only through [`ReservationRepository`]:
//! read the full snapshot, append one reservation atomically. Three
//! implementations are provided:
//!
//! - [`JsonFileReservationRepository`]: the whole list as one JSON document,
//!   rewritten atomically (temp file + rename) on every append
//! - [`InMemoryReservationRepository`]: process-local, for tests
//! - `SqlReservationRepository` (feature `sqlite`): one row per reservation
//!   with a unique index on the slot
//!
//! # Example
//!
//! ```rust,no_run
//! use cabinet_config::AppConfig;
//! use cabinet_db::open_reservation_store;
//!
//! async fn setup() -> Result<(), cabinet_db::DbError> {
//!     let config = AppConfig::default();
//!     let store = open_reservation_store(&config).await?;
//!     let reservations = store.snapshot().await?;
//!     println!("{} reservations", reservations.len());
//!     Ok(())
//! }
//! ```

#[cfg(feature = "sqlite")]
pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;
pub mod repository;

#[cfg(feature = "sqlite")]
pub use client::DbClient;
pub use error::DbError;
pub use factory::open_reservation_store;
pub use repository::ReservationRepository;

pub use repositories::{InMemoryReservationRepository, JsonFileReservationRepository};
#[cfg(feature = "sqlite")]
pub use repositories::SqlReservationRepository;
