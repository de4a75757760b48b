//! iCalendar (RFC 5545) rendering of the reservation list.

use cabinet_booking::parse_slot;
use cabinet_common::Reservation;
use cabinet_config::CalendarConfig;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::warn;

const PRODID: &str = "-//cabinet//booking feed//EN";
const MAX_LINE_OCTETS: usize = 75;
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Escape a TEXT value (RFC 5545 §3.3.11).
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Fold a content line at 75 octets without splitting a UTF-8 sequence.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    for c in line.chars() {
        // Continuation lines start with a space, which counts toward the limit.
        if width + c.len_utf8() > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += c.len_utf8();
    }
    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(&fold_line(line));
    out.push_str("\r\n");
}

/// Render every reservation as a VEVENT.
///
/// Stored values that no longer parse as a slot are skipped with a warning.
pub fn render_calendar(reservations: &[Reservation], config: &CalendarConfig, timezone: Tz) -> String {
    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{}", PRODID));
    push_line(&mut out, "CALSCALE:GREGORIAN");
    push_line(&mut out, "METHOD:PUBLISH");
    push_line(&mut out, &format!("X-WR-CALNAME:{}", escape_text(&config.name)));

    let length = Duration::minutes(config.event_minutes.max(1));

    for reservation in reservations {
        let slot = match parse_slot(&reservation.date_time, timezone) {
            Ok(slot) => slot,
            Err(e) => {
                warn!("Skipping reservation {:?} in calendar feed: {}", reservation.date_time, e);
                continue;
            }
        };
        let start = slot.instant();
        let end = start + length;
        let service = reservation.service_type;

        push_line(&mut out, "BEGIN:VEVENT");
        push_line(
            &mut out,
            &format!("UID:{}@cabinet-booking", slot.local().format("%Y%m%dT%H%M")),
        );
        push_line(&mut out, &format!("DTSTAMP:{}", utc(reservation.created_at)));
        push_line(&mut out, &format!("DTSTART:{}", utc(start)));
        push_line(&mut out, &format!("DTEND:{}", utc(end)));
        push_line(&mut out, &format!("SUMMARY:{}", escape_text(&format!("Consultation - {}", service))));
        push_line(&mut out, &format!("DESCRIPTION:{}", escape_text(&format!("Session {}", service))));
        if let Some(location) = config.location.as_deref() {
            push_line(&mut out, &format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(url) = config.url.as_deref() {
            push_line(&mut out, &format!("URL:{}", url));
        }
        push_line(&mut out, "END:VEVENT");
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

fn utc(instant: DateTime<Utc>) -> String {
    instant.format(UTC_FORMAT).to_string()
}
