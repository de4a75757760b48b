// --- File: crates/cabinet_common/src/models.rs ---

// Data structures shared by the store, the booking core and the feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// The kinds of appointment the practitioner offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// In person, at the practice.
    Cabinet,
    /// Video call.
    Visio,
    Telephone,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Cabinet => "cabinet",
            ServiceType::Visio => "visio",
            ServiceType::Telephone => "telephone",
        }
    }

    /// Whether the appointment takes place remotely (visio or telephone).
    pub fn is_remote(&self) -> bool {
        !matches!(self, ServiceType::Cabinet)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown service type '{0}'")]
pub struct UnknownServiceType(pub String);

impl FromStr for ServiceType {
    type Err = UnknownServiceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cabinet" => Ok(ServiceType::Cabinet),
            "visio" => Ok(ServiceType::Visio),
            "telephone" => Ok(ServiceType::Telephone),
            other => Err(UnknownServiceType(other.to_string())),
        }
    }
}

/// Raw booking request as submitted by the client or read back from payment metadata.
///
/// Both fields are optional here so that a missing field is reported as
/// `invalid_input` by the validator rather than as a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CandidateRequest {
    #[cfg_attr(feature = "openapi", schema(example = "15/08/2025 14:30"))]
    pub date_time: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "cabinet"))]
    pub service_type: Option<String>,
}

impl CandidateRequest {
    pub fn new(date_time: impl Into<String>, service_type: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            service_type: Some(service_type.into()),
        }
    }
}

/// A confirmed, paid reservation. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Canonical local slot, `YYYY-MM-DDTHH:MM`. Unique across the store.
    #[cfg_attr(feature = "openapi", schema(example = "2025-08-15T14:30"))]
    pub date_time: String,
    pub service_type: ServiceType,
    /// Checkout session that paid for this reservation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_session_id: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
