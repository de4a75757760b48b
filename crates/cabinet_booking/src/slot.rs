//! Slot time parsing and normalization.
//!
//! Every place that compares, stores or displays a booking date-time goes
//! through [`parse_slot`]. Wall-clock inputs are interpreted in the
//! practitioner's timezone; the canonical stored form is `YYYY-MM-DDTHH:MM`
//! in that timezone.

use chrono::{
    DateTime, Datelike, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use std::fmt;
use thiserror::Error;

/// Format of the canonical stored representation.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Local wall-clock formats accepted from clients and legacy records.
const LOCAL_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotParseError {
    #[error("date/time is empty")]
    Empty,
    #[error("unrecognized date/time '{0}'")]
    Unrecognized(String),
    #[error("'{0}' does not exist in the local timezone")]
    NonexistentLocalTime(String),
}

/// A bookable instant, minute precision, tied to the practitioner's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTime {
    local: NaiveDateTime,
    instant: DateTime<Utc>,
}

impl SlotTime {
    /// `YYYY-MM-DDTHH:MM` local time; the de-duplication key.
    pub fn canonical(&self) -> String {
        self.local.format(CANONICAL_FORMAT).to_string()
    }

    pub fn local(&self) -> NaiveDateTime {
        self.local
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn weekday(&self) -> Weekday {
        self.local.weekday()
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.local.time()
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Parse a client or stored date-time string into a [`SlotTime`].
///
/// RFC 3339 values carry their own offset and are converted into `tz`; all
/// other formats are local wall-clock time in `tz`. Seconds are dropped.
/// Ambiguous local times (DST fold) resolve to the earlier instant.
pub fn parse_slot(raw: &str, tz: Tz) -> Result<SlotTime, SlotParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SlotParseError::Empty);
    }

    let local = if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        with_offset.with_timezone(&tz).naive_local()
    } else {
        LOCAL_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .ok_or_else(|| SlotParseError::Unrecognized(trimmed.to_string()))?
    };

    let local = local
        .date()
        .and_hms_opt(local.hour(), local.minute(), 0)
        .ok_or_else(|| SlotParseError::Unrecognized(trimmed.to_string()))?;

    let instant = match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            return Err(SlotParseError::NonexistentLocalTime(trimmed.to_string()))
        }
    };

    Ok(SlotTime {
        local,
        instant: instant.with_timezone(&Utc),
    })
}

/// Key used for exact-match conflict detection on stored values.
///
/// Stored strings that no longer parse are compared verbatim.
pub fn conflict_key(stored: &str, tz: Tz) -> String {
    parse_slot(stored, tz)
        .map(|slot| slot.canonical())
        .unwrap_or_else(|_| stored.to_string())
}
