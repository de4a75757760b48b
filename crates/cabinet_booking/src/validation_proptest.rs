use crate::validation::*;
use cabinet_common::{CandidateRequest, Reservation, ServiceType};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

fn service_type_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("cabinet"), Just("visio"), Just("telephone"), Just("bogus")]
}

// Summer week with no DST transition, so local strings map back one-to-one.
fn base_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
}

fn local_slot_after(now: DateTime<Utc>, minutes: i64) -> String {
    (now + Duration::minutes(minutes))
        .with_timezone(&chrono_tz::Europe::Paris)
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

proptest! {
    #[test]
    fn validate_is_deterministic(
        minutes in -600i64..20_000,
        service_type in service_type_strategy(),
        taken in proptest::collection::vec(0i64..20_000, 0..5),
    ) {
        let now = base_now();
        let snapshot: Vec<Reservation> = taken
            .iter()
            .map(|m| Reservation {
                date_time: local_slot_after(now, *m),
                service_type: ServiceType::Visio,
                payment_session_id: None,
                created_at: now,
            })
            .collect();
        let candidate = CandidateRequest::new(local_slot_after(now, minutes), service_type);
        let policy = BookingPolicy::default();

        let first = validate(&candidate, &snapshot, now, &policy);
        let second = validate(&candidate, &snapshot, now, &policy);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn remote_lead_time_is_a_sharp_threshold(minutes in 0i64..10_000) {
        let now = base_now();
        let policy = BookingPolicy { remote_window: None, ..BookingPolicy::default() };
        let candidate = CandidateRequest::new(local_slot_after(now, minutes), "visio");

        let result = validate(&candidate, &[], now, &policy);
        if minutes >= 120 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(Rejection::TooSoon { required_hours: 2 }));
        }
    }

    #[test]
    fn taken_slots_are_always_rejected(minutes in 1_500i64..10_000, service_type in service_type_strategy()) {
        prop_assume!(service_type != "bogus");
        let now = base_now();
        let slot = local_slot_after(now, minutes);
        let snapshot = [Reservation {
            date_time: slot.clone(),
            service_type: ServiceType::Cabinet,
            payment_session_id: None,
            created_at: now,
        }];

        let result = validate(&CandidateRequest::new(slot, service_type), &snapshot, now, &BookingPolicy::default());
        prop_assert_eq!(result, Err(Rejection::SlotTaken));
    }
}
