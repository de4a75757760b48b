// --- File: crates/cabinet_booking/src/lib.rs ---

pub mod slot;
pub mod validation;
#[cfg(test)]
mod validation_proptest;
#[cfg(test)]
mod validation_test;
pub mod notifier;
pub mod logic;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod doc;

// Re-export for main backend
pub use routes::routes;
pub use error::BookingError;
pub use logic::{CheckoutSession, ConfirmationOutcome, DropReason, Pricing, ReservationDesk};
pub use notifier::{notifier_for, ReservationNotifier};
pub use slot::{parse_slot, SlotTime};
pub use validation::{validate, BookingPolicy, Rejection};
