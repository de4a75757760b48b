//! JSON file implementation of the reservation repository
//!
//! The whole reservation list lives in one JSON array. Appends rewrite the
//! document into a sibling temp file and rename it over the original, so a
//! reader never observes a half-written file.

use crate::error::DbError;
use crate::repository::ReservationRepository;
use cabinet_common::services::BoxFuture;
use cabinet_common::Reservation;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Reservation store backed by a single JSON document on disk.
#[derive(Debug)]
pub struct JsonFileReservationRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileReservationRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<Reservation>, DbError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Reservation file {} not found, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(DbError::Io(e)),
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let reservations: Vec<Reservation> = serde_json::from_slice(&raw)?;
        Ok(reservations)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "reservations.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write_all(&self, reservations: &[Reservation]) -> Result<(), DbError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_vec_pretty(reservations)?;
        let tmp = self.temp_path();
        let replaced = match write_synced(&tmp, &body).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = replaced {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(DbError::Io(e));
        }
        sync_parent_dir(&self.path).await;
        Ok(())
    }
}

/// Write `body` to a fresh file and flush it to disk before returning.
async fn write_synced(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(body).await?;
    file.sync_all().await
}

/// Persist the rename itself. Not every platform can open a directory.
async fn sync_parent_dir(path: &Path) {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if let Ok(dir) = tokio::fs::File::open(parent).await {
        if let Err(e) = dir.sync_all().await {
            debug!("Could not sync directory {}: {}", parent.display(), e);
        }
    }
}

impl ReservationRepository for JsonFileReservationRepository {
    fn snapshot(&self) -> BoxFuture<'_, Vec<Reservation>, DbError> {
        Box::pin(async move { self.read_all().await })
    }

    fn append(&self, reservation: Reservation) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;

            let mut reservations = self.read_all().await?;
            if reservations.iter().any(|r| r.date_time == reservation.date_time) {
                return Err(DbError::Duplicate(reservation.date_time));
            }

            reservations.push(reservation);
            self.write_all(&reservations).await?;

            info!(
                "Stored reservation #{} in {}",
                reservations.len(),
                self.path.display()
            );
            Ok(())
        })
    }
}
