// --- File: crates/cabinet_stripe/src/lib.rs ---

pub mod logic;
pub mod error;
pub mod service;

pub use error::StripeError;
pub use logic::{signature_header, verify_stripe_signature, StripeEvent};
pub use service::StripePaymentService;
