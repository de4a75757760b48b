//! SQL implementation of the reservation repository
//!
//! One row per reservation. The `UNIQUE(date_time)` constraint makes the
//! database itself refuse a second booking of the same stored slot.

use crate::error::DbError;
use crate::repository::ReservationRepository;
use crate::DbClient;
use cabinet_common::services::BoxFuture;
use cabinet_common::Reservation;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQLite-backed reservation store.
#[derive(Debug, Clone)]
pub struct SqlReservationRepository {
    db_client: DbClient,
}

impl SqlReservationRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the `reservations` table if it does not exist yet.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing reservation schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS reservations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date_time TEXT NOT NULL,
                service_type TEXT NOT NULL,
                payment_session_id TEXT,
                created_at TEXT NOT NULL,
                UNIQUE(date_time)
            )
        "#;

        self.db_client.execute(query).await?;

        info!("Reservation schema initialized successfully");
        Ok(())
    }

    fn from_row(row: &SqliteRow) -> Result<Reservation, DbError> {
        let date_time: String = row.try_get("date_time")?;
        let service_type: String = row.try_get("service_type")?;
        let payment_session_id: Option<String> = row.try_get("payment_session_id")?;
        let created_raw: String = row.try_get("created_at")?;

        let service_type = service_type
            .parse()
            .map_err(|e| DbError::Corrupt(format!("reservation {}: {}", date_time, e)))?;
        let created_at = DateTime::parse_from_rfc3339(&created_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DbError::Corrupt(format!("created_at {:?}: {}", created_raw, e)))?;

        Ok(Reservation {
            date_time,
            service_type,
            payment_session_id,
            created_at,
        })
    }
}

impl ReservationRepository for SqlReservationRepository {
    fn snapshot(&self) -> BoxFuture<'_, Vec<Reservation>, DbError> {
        Box::pin(async move {
            let query = r#"
                SELECT date_time, service_type, payment_session_id, created_at
                FROM reservations
                ORDER BY id
            "#;

            let rows = sqlx::query(query)
                .fetch_all(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to load reservations: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            rows.iter().map(Self::from_row).collect()
        })
    }

    fn append(&self, reservation: Reservation) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            let query = r#"
                INSERT INTO reservations (date_time, service_type, payment_session_id, created_at)
                VALUES ($1, $2, $3, $4)
            "#;

            let result = sqlx::query(query)
                .bind(&reservation.date_time)
                .bind(reservation.service_type.as_str())
                .bind(&reservation.payment_session_id)
                .bind(reservation.created_at.to_rfc3339())
                .execute(self.db_client.pool())
                .await;

            match result {
                Ok(_) => {
                    info!("Stored reservation for {}", reservation.date_time);
                    Ok(())
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    Err(DbError::Duplicate(reservation.date_time))
                }
                Err(e) => {
                    error!("Failed to insert reservation: {}", e);
                    Err(DbError::QueryError(e.to_string()))
                }
            }
        })
    }
}
