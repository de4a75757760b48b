use super::*;
use crate::{DbClient, DbError, ReservationRepository};
use cabinet_common::{Reservation, ServiceType};
use chrono::{TimeZone, Utc};

async fn memory_repo() -> SqlReservationRepository {
    let client = DbClient::connect("sqlite::memory:").await.unwrap();
    let repo = SqlReservationRepository::new(client);
    repo.init_schema().await.unwrap();
    repo
}

fn reservation(date_time: &str) -> Reservation {
    Reservation {
        date_time: date_time.to_string(),
        service_type: ServiceType::Telephone,
        payment_session_id: Some("cs_test_sql".to_string()),
        created_at: Utc.with_ymd_and_hms(2025, 8, 1, 10, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn round_trips_rows_in_insertion_order() {
    let repo = memory_repo().await;
    repo.append(reservation("2025-08-15T14:30")).await.unwrap();
    repo.append(reservation("2025-08-14T09:00")).await.unwrap();

    let stored = repo.snapshot().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].date_time, "2025-08-15T14:30");
    assert_eq!(stored[1], reservation("2025-08-14T09:00"));
}

#[tokio::test]
async fn unique_constraint_reports_duplicate() {
    let repo = memory_repo().await;
    repo.append(reservation("2025-08-15T14:30")).await.unwrap();

    let err = repo.append(reservation("2025-08-15T14:30")).await.unwrap_err();
    assert!(matches!(err, DbError::Duplicate(_)));
    assert_eq!(repo.snapshot().await.unwrap().len(), 1);
}

#[tokio::test]
async fn schema_init_is_idempotent() {
    let repo = memory_repo().await;
    repo.init_schema().await.unwrap();
    assert!(repo.snapshot().await.unwrap().is_empty());
}
