//! SQLite client for the reservation store

use crate::error::DbError;
use cabinet_config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Pooled connection to the reservation database.
#[derive(Debug, Clone)]
pub struct DbClient {
    pool: SqlitePool,
}

impl DbClient {
    /// Connect using the `[database]` section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty or malformed, or the connection fails.
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        if db_config.url.trim().is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }
        Self::connect(&db_config.url).await
    }

    /// Connect to a SQLite database URL, creating the file when missing.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        debug!("Connecting to database: {}", url);

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DbError::ConfigError(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        // An in-memory database exists per connection.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Failed to connect to database: {}", e);
                DbError::SqlxError(e)
            })?;

        info!("Connected to database");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute a statement that returns no rows.
    pub async fn execute(&self, query: &str) -> Result<(), DbError> {
        sqlx::query(query).execute(&self.pool).await.map_err(|e| {
            error!("Failed to execute query: {}", e);
            DbError::QueryError(e.to_string())
        })?;
        Ok(())
    }
}
