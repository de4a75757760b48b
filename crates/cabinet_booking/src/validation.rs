//! The slot validator.
//!
//! [`validate`] is a pure function of the candidate, the current reservation
//! snapshot, the current instant and the policy. It runs before a checkout
//! session is created and again, authoritatively, when payment is confirmed.

use crate::slot::{conflict_key, parse_slot, SlotTime};
use cabinet_common::{CandidateRequest, Reservation, ServiceType};
use cabinet_config::BookingConfig;
use chrono::{DateTime, Duration, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use thiserror::Error;

/// Why a candidate cannot be booked. The first failing rule wins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("invalid booking request: {0}")]
    InvalidInput(String),
    #[error("this slot is already booked")]
    SlotTaken,
    #[error("the cabinet is closed on Sundays")]
    ClosedDay,
    #[error("appointments must be booked at least {required_hours} hours in advance")]
    TooSoon { required_hours: i64 },
    #[error("remote appointments are available between {start} and {end}")]
    OutOfWindow { start: String, end: String },
}

impl Rejection {
    /// Stable reason code returned to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::InvalidInput(_) => "invalid_input",
            Rejection::SlotTaken => "slot_taken",
            Rejection::ClosedDay => "closed_day",
            Rejection::TooSoon { .. } => "too_soon",
            Rejection::OutOfWindow { .. } => "out_of_window",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("unknown timezone '{0}'")]
    Timezone(String),
    #[error("invalid window bound '{0}', expected HH:MM")]
    WindowBound(String),
    #[error("remote window starts after it ends ({0} > {1})")]
    EmptyWindow(String, String),
    #[error("lead time must not be negative")]
    NegativeLead,
}

/// Inclusive daily time-of-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DailyWindow {
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Business rules applied by [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct BookingPolicy {
    pub timezone: Tz,
    pub cabinet_lead: Duration,
    pub remote_lead: Duration,
    /// `None` disables the window rule.
    pub remote_window: Option<DailyWindow>,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Paris,
            cabinet_lead: Duration::hours(24),
            remote_lead: Duration::hours(2),
            remote_window: Some(DailyWindow {
                start: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
                end: NaiveTime::from_hms_opt(23, 30, 0).unwrap_or(NaiveTime::MIN),
            }),
        }
    }
}

impl BookingPolicy {
    pub fn from_config(config: &BookingConfig) -> Result<Self, PolicyError> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| PolicyError::Timezone(config.timezone.clone()))?;

        if config.cabinet_lead_hours < 0 || config.remote_lead_hours < 0 {
            return Err(PolicyError::NegativeLead);
        }

        let remote_window = if config.enforce_remote_window {
            let start = parse_bound(&config.remote_window_start)?;
            let end = parse_bound(&config.remote_window_end)?;
            if start > end {
                return Err(PolicyError::EmptyWindow(
                    config.remote_window_start.clone(),
                    config.remote_window_end.clone(),
                ));
            }
            Some(DailyWindow { start, end })
        } else {
            None
        };

        Ok(Self {
            timezone,
            cabinet_lead: Duration::hours(config.cabinet_lead_hours),
            remote_lead: Duration::hours(config.remote_lead_hours),
            remote_window,
        })
    }

    fn lead_for(&self, service_type: ServiceType) -> Duration {
        if service_type.is_remote() {
            self.remote_lead
        } else {
            self.cabinet_lead
        }
    }
}

fn parse_bound(raw: &str) -> Result<NaiveTime, PolicyError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| PolicyError::WindowBound(raw.to_string()))
}

/// A candidate that passed every rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedSlot {
    pub service_type: ServiceType,
    pub slot: SlotTime,
}

/// Decide whether `candidate` may be booked given `snapshot` at `now`.
///
/// Rules, first failure wins: well-formed input, exact-match conflict,
/// cabinet closed on Sunday, lead time (boundary inclusive), remote
/// time-of-day window.
pub fn validate(
    candidate: &CandidateRequest,
    snapshot: &[Reservation],
    now: DateTime<Utc>,
    policy: &BookingPolicy,
) -> Result<AcceptedSlot, Rejection> {
    let service_type: ServiceType = candidate
        .service_type
        .as_deref()
        .ok_or_else(|| Rejection::InvalidInput("serviceType is required".to_string()))?
        .parse()
        .map_err(|e| Rejection::InvalidInput(format!("{}", e)))?;

    let raw_date = candidate
        .date_time
        .as_deref()
        .ok_or_else(|| Rejection::InvalidInput("dateTime is required".to_string()))?;
    let slot = parse_slot(raw_date, policy.timezone)
        .map_err(|e| Rejection::InvalidInput(e.to_string()))?;

    let key = slot.canonical();
    if snapshot
        .iter()
        .any(|existing| conflict_key(&existing.date_time, policy.timezone) == key)
    {
        return Err(Rejection::SlotTaken);
    }

    if service_type == ServiceType::Cabinet && slot.weekday() == Weekday::Sun {
        return Err(Rejection::ClosedDay);
    }

    let lead = policy.lead_for(service_type);
    if slot.instant() - now < lead {
        return Err(Rejection::TooSoon {
            required_hours: lead.num_hours(),
        });
    }

    if service_type.is_remote() {
        if let Some(window) = policy.remote_window {
            if !window.contains(slot.time_of_day()) {
                return Err(Rejection::OutOfWindow {
                    start: window.start.format("%H:%M").to_string(),
                    end: window.end.format("%H:%M").to_string(),
                });
            }
        }
    }

    Ok(AcceptedSlot { service_type, slot })
}
