//! Selects the reservation store from configuration

use crate::error::DbError;
use crate::repository::ReservationRepository;
use crate::JsonFileReservationRepository;
use cabinet_config::AppConfig;
use std::sync::Arc;
use tracing::info;

/// Open the configured reservation store.
///
/// With the `sqlite` feature and a `[database]` section the SQL store is used
/// (schema created on first use). Otherwise reservations go to the JSON file
/// at `store.path`.
pub async fn open_reservation_store(
    config: &AppConfig,
) -> Result<Arc<dyn ReservationRepository>, DbError> {
    if let Some(repo) = open_sql_store(config).await? {
        return Ok(repo);
    }

    if config.store.path.trim().is_empty() {
        return Err(DbError::ConfigError("store.path is empty".to_string()));
    }

    info!("Using JSON reservation store at {}", config.store.path);
    Ok(Arc::new(JsonFileReservationRepository::new(&config.store.path)))
}

#[cfg(feature = "sqlite")]
async fn open_sql_store(
    config: &AppConfig,
) -> Result<Option<Arc<dyn ReservationRepository>>, DbError> {
    let Some(db_config) = config.database.as_ref() else {
        return Ok(None);
    };
    let client = crate::DbClient::from_config(db_config).await?;
    let repo = crate::SqlReservationRepository::new(client);
    repo.init_schema().await?;
    info!("Using SQL reservation store");
    Ok(Some(Arc::new(repo)))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sql_store(
    config: &AppConfig,
) -> Result<Option<Arc<dyn ReservationRepository>>, DbError> {
    if config.database.is_some() {
        tracing::warn!("[database] configured but built without the sqlite feature; using the JSON store");
    }
    Ok(None)
}
