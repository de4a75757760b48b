use crate::validation::*;
use cabinet_common::{CandidateRequest, Reservation, ServiceType};
use cabinet_config::BookingConfig;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn stored(date_time: &str, service_type: ServiceType) -> Reservation {
    Reservation {
        date_time: date_time.to_string(),
        service_type,
        payment_session_id: None,
        created_at: at(2025, 8, 1, 0, 0),
    }
}

fn check(date_time: &str, service_type: &str, snapshot: &[Reservation], now: DateTime<Utc>) -> Result<AcceptedSlot, Rejection> {
    validate(
        &CandidateRequest::new(date_time, service_type),
        snapshot,
        now,
        &BookingPolicy::default(),
    )
}

#[test]
fn accepts_friday_cabinet_slot() {
    let accepted = check("15/08/2025 14:30", "cabinet", &[], at(2025, 8, 10, 9, 0)).unwrap();
    assert_eq!(accepted.service_type, ServiceType::Cabinet);
    assert_eq!(accepted.slot.canonical(), "2025-08-15T14:30");
}

#[test]
fn missing_or_unknown_fields_are_invalid_input() {
    let now = at(2025, 8, 10, 9, 0);
    let policy = BookingPolicy::default();

    let no_type = CandidateRequest {
        date_time: Some("15/08/2025 14:30".into()),
        service_type: None,
    };
    let no_date = CandidateRequest {
        date_time: None,
        service_type: Some("visio".into()),
    };
    for candidate in [no_type, no_date, CandidateRequest::default()] {
        let err = validate(&candidate, &[], now, &policy).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    assert_eq!(check("15/08/2025 14:30", "massage", &[], now).unwrap_err().code(), "invalid_input");
    assert_eq!(check("next friday", "cabinet", &[], now).unwrap_err().code(), "invalid_input");
}

#[test]
fn invalid_input_wins_over_everything() {
    // Unknown type on a taken Sunday slot in the past.
    let snapshot = [stored("2025-08-17T10:00", ServiceType::Cabinet)];
    let err = check("17/08/2025 10:00", "house-call", &snapshot, at(2025, 8, 20, 0, 0)).unwrap_err();
    assert_eq!(err.code(), "invalid_input");
}

#[test]
fn exact_match_conflict_across_formats() {
    let now = at(2025, 8, 10, 9, 0);
    let legacy = [stored("15/08/2025 14:30", ServiceType::Visio)];
    let canonical = [stored("2025-08-15T14:30", ServiceType::Visio)];

    assert_eq!(check("2025-08-15T14:30", "cabinet", &legacy, now), Err(Rejection::SlotTaken));
    assert_eq!(check("15/08/2025 14:30", "telephone", &canonical, now), Err(Rejection::SlotTaken));
    // Adjacent minute is a different slot.
    assert!(check("15/08/2025 14:31", "cabinet", &canonical, now).is_ok());
}

#[test]
fn unparseable_stored_values_do_not_block_other_slots() {
    let snapshot = [stored("garbage", ServiceType::Cabinet)];
    assert!(check("15/08/2025 14:30", "cabinet", &snapshot, at(2025, 8, 10, 9, 0)).is_ok());
}

#[test]
fn sunday_closes_cabinet_only() {
    let now = at(2025, 8, 10, 9, 0);
    assert_eq!(check("17/08/2025 10:00", "cabinet", &[], now), Err(Rejection::ClosedDay));
    assert!(check("17/08/2025 10:00", "visio", &[], now).is_ok());
    assert!(check("17/08/2025 10:00", "telephone", &[], now).is_ok());
}

#[test]
fn conflict_is_checked_before_closed_day() {
    let snapshot = [stored("2025-08-17T10:00", ServiceType::Visio)];
    assert_eq!(
        check("17/08/2025 10:00", "cabinet", &snapshot, at(2025, 8, 10, 9, 0)),
        Err(Rejection::SlotTaken)
    );
}

#[test]
fn closed_day_is_checked_before_lead_time() {
    // Sunday slot one hour away.
    assert_eq!(
        check("17/08/2025 10:00", "cabinet", &[], at(2025, 8, 17, 7, 0)),
        Err(Rejection::ClosedDay)
    );
}

#[test]
fn cabinet_lead_time_boundary() {
    // 15/08/2025 14:30 Paris is 12:30 UTC.
    assert!(check("15/08/2025 14:30", "cabinet", &[], at(2025, 8, 14, 12, 30)).is_ok());
    assert_eq!(
        check("15/08/2025 14:30", "cabinet", &[], at(2025, 8, 14, 12, 31)),
        Err(Rejection::TooSoon { required_hours: 24 })
    );
}

#[test]
fn remote_lead_time_boundary() {
    // 20/08/2025 09:00 Paris is 07:00 UTC.
    assert!(check("20/08/2025 09:00", "visio", &[], at(2025, 8, 20, 5, 0)).is_ok());
    assert_eq!(
        check("20/08/2025 09:00", "visio", &[], at(2025, 8, 20, 5, 1)),
        Err(Rejection::TooSoon { required_hours: 2 })
    );
    assert_eq!(
        check("20/08/2025 09:00", "telephone", &[], at(2025, 8, 20, 5, 1)).unwrap_err().code(),
        "too_soon"
    );
}

#[test]
fn past_slots_are_too_soon() {
    assert_eq!(
        check("01/08/2025 10:00", "visio", &[], at(2025, 8, 10, 9, 0)).unwrap_err().code(),
        "too_soon"
    );
}

#[test]
fn remote_window_is_inclusive() {
    let now = at(2025, 8, 10, 9, 0);
    assert!(check("20/08/2025 07:00", "visio", &[], now).is_ok());
    assert!(check("20/08/2025 23:30", "telephone", &[], now).is_ok());

    let early = check("20/08/2025 06:59", "visio", &[], now).unwrap_err();
    assert_eq!(early.code(), "out_of_window");
    let late = check("20/08/2025 23:31", "telephone", &[], now).unwrap_err();
    assert_eq!(late.code(), "out_of_window");
}

#[test]
fn window_does_not_apply_to_cabinet() {
    assert!(check("20/08/2025 06:30", "cabinet", &[], at(2025, 8, 10, 9, 0)).is_ok());
}

#[test]
fn window_can_be_disabled() {
    let policy = BookingPolicy {
        remote_window: None,
        ..BookingPolicy::default()
    };
    let candidate = CandidateRequest::new("20/08/2025 03:00", "visio");
    assert!(validate(&candidate, &[], at(2025, 8, 10, 9, 0), &policy).is_ok());
}

#[test]
fn policy_from_config() {
    let config = BookingConfig {
        timezone: "America/New_York".into(),
        cabinet_lead_hours: 48,
        remote_window_start: "08:00".into(),
        remote_window_end: "20:00".into(),
        ..BookingConfig::default()
    };
    let policy = BookingPolicy::from_config(&config).unwrap();
    assert_eq!(policy.timezone, chrono_tz::America::New_York);
    assert_eq!(policy.cabinet_lead, Duration::hours(48));
    assert_eq!(policy.remote_window.unwrap().start, NaiveTime::from_hms_opt(8, 0, 0).unwrap());

    assert_eq!(BookingPolicy::from_config(&BookingConfig::default()).unwrap(), BookingPolicy::default());
}

#[test]
fn policy_rejects_bad_config() {
    let bad_tz = BookingConfig {
        timezone: "Mars/Olympus".into(),
        ..BookingConfig::default()
    };
    assert!(matches!(BookingPolicy::from_config(&bad_tz), Err(PolicyError::Timezone(_))));

    let bad_bound = BookingConfig {
        remote_window_end: "late".into(),
        ..BookingConfig::default()
    };
    assert!(matches!(BookingPolicy::from_config(&bad_bound), Err(PolicyError::WindowBound(_))));

    let inverted = BookingConfig {
        remote_window_start: "22:00".into(),
        remote_window_end: "08:00".into(),
        ..BookingConfig::default()
    };
    assert!(matches!(BookingPolicy::from_config(&inverted), Err(PolicyError::EmptyWindow(_, _))));

    let disabled = BookingConfig {
        enforce_remote_window: false,
        remote_window_end: "late".into(),
        ..BookingConfig::default()
    };
    assert_eq!(BookingPolicy::from_config(&disabled).unwrap().remote_window, None);
}
