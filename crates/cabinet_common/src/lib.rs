// --- File: crates/cabinet_common/src/lib.rs ---

// Declare modules within this crate
pub mod models;    // Reservation and candidate data structures
pub mod error;     // Error handling
pub mod http;      // HTTP utilities
pub mod services;  // Service abstractions
pub mod logging;   // Logging utilities
pub mod features;  // Runtime feature flag handling

// Re-export error types and utilities for easier access
pub use error::{
    CabinetError,
    HttpStatusCode,
    config_error,
};

// Re-export HTTP utilities for easier access
pub use http::{IntoHttpResponse, client::HTTP_CLIENT};

// Re-export logging utilities for easier access
pub use logging::{init_from_config, init_with_level};

pub use features::is_feature_enabled;

pub use models::{CandidateRequest, Reservation, ServiceType};
