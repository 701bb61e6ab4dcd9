//! TTL-bound key-value store over SQLite.
//!
//! Pastes are opaque serialized blobs: the whole entry is written in a single
//! `set` and never mutated afterwards, so no read-modify-write race exists.
//! Expiry is enforced twice: `get` treats an expired row as absent (and
//! lazily deletes it), and a background sweep purges expired rows so the
//! database does not grow unbounded.

pub mod migrations;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Type alias for the shared database connection.
/// rusqlite is synchronous — we wrap in Arc<Mutex> for thread safety
/// with tokio::task::spawn_blocking for store operations.
pub type DbPool = Arc<Mutex<Connection>>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Transient unavailability (busy/locked database, poisoned lock).
    /// Callers may retry once via [`retry_once`].
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        if is_transient(&e) {
            StoreError::Unavailable(e.to_string())
        } else {
            StoreError::Database(e)
        }
    }
}

fn is_transient(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            )
    )
}

/// Initialize the SQLite database: create data directory if needed,
/// open (or create) the database file, enable WAL mode, and run migrations.
pub fn init_db(data_dir: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(data_dir)?;

    let db_path = Path::new(data_dir).join("pastebox.db");
    let mut conn = Connection::open(&db_path)?;

    // WAL mode for better concurrent read performance
    conn.pragma_update(None, "journal_mode", "WAL")?;

    let migrations = migrations::migrations();
    migrations.to_latest(&mut conn)?;

    tracing::info!("Database initialized at {}", db_path.display());

    Ok(Arc::new(Mutex::new(conn)))
}

/// Open an in-memory database with the full schema (tests).
pub fn init_db_in_memory() -> Result<DbPool, Box<dyn std::error::Error>> {
    let mut conn = Connection::open_in_memory()?;
    migrations::migrations().to_latest(&mut conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn lock(db: &DbPool) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
    db.lock()
        .map_err(|e| StoreError::Unavailable(format!("connection lock poisoned: {e}")))
}

/// Store a value under `key`, expiring `ttl_secs` from now.
/// A `ttl_secs` of zero or less means the value never expires (counters).
/// The whole value is written in one statement — no partial writes.
pub fn set(db: &DbPool, key: &str, value: &str, ttl_secs: i64) -> Result<(), StoreError> {
    let expires_at = if ttl_secs > 0 {
        Some(Utc::now().timestamp() + ttl_secs)
    } else {
        None
    };

    let conn = lock(db)?;
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value, expires_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![key, value, expires_at],
    )?;
    Ok(())
}

/// Fetch a value by key. Returns `Ok(None)` when the key is absent or the
/// row has expired; an expired row is deleted on the way out, so absence
/// from the store *is* expiry with no intermediate observable state.
pub fn get(db: &DbPool, key: &str) -> Result<Option<String>, StoreError> {
    let conn = lock(db)?;

    let row: Option<(String, Option<i64>)> = conn
        .query_row(
            "SELECT value, expires_at FROM kv WHERE key = ?1",
            rusqlite::params![key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((value, expires_at)) => {
            if let Some(deadline) = expires_at {
                if Utc::now().timestamp() >= deadline {
                    conn.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
                    return Ok(None);
                }
            }
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Add `delta` to a named statistics counter, creating it at zero first.
/// Best-effort: callers are expected to ignore failures.
pub fn add_to_counter(db: &DbPool, name: &str, delta: f64) -> Result<(), StoreError> {
    let conn = lock(db)?;
    conn.execute(
        "INSERT INTO counters (name, value) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET value = value + excluded.value",
        rusqlite::params![name, delta],
    )?;
    Ok(())
}

/// Read a statistics counter. Missing counters read as zero.
pub fn counter(db: &DbPool, name: &str) -> Result<f64, StoreError> {
    let conn = lock(db)?;
    let value: Option<f64> = conn
        .query_row(
            "SELECT value FROM counters WHERE name = ?1",
            rusqlite::params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.unwrap_or(0.0))
}

/// Delete all rows whose `expires_at` is in the past.
///
/// Returns the number of rows purged.
pub fn purge_expired(db: &DbPool) -> Result<usize, StoreError> {
    let conn = lock(db)?;
    let count = conn.execute(
        "DELETE FROM kv WHERE expires_at IS NOT NULL AND expires_at < ?1",
        rusqlite::params![Utc::now().timestamp()],
    )?;
    Ok(count)
}

/// Run a store operation, retrying once after a short pause if it fails
/// with a transient unavailability. A second failure propagates.
pub fn retry_once<T>(mut op: impl FnMut() -> Result<T, StoreError>) -> Result<T, StoreError> {
    match op() {
        Err(StoreError::Unavailable(e)) => {
            tracing::warn!("Store transiently unavailable, retrying once: {}", e);
            std::thread::sleep(std::time::Duration::from_millis(50));
            op()
        }
        other => other,
    }
}

/// Spawn a background task that periodically purges expired pastes.
///
/// Runs `purge_expired` every `interval_secs` seconds.
/// Logs the number of purged rows each cycle.
pub fn spawn_expiry_sweep(db: DbPool, interval_secs: u64) {
    let interval = std::time::Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let db_clone = db.clone();
            match tokio::task::spawn_blocking(move || purge_expired(&db_clone)).await {
                Ok(Ok(count)) => {
                    if count > 0 {
                        tracing::info!("Expiry sweep: purged {} expired pastes", count);
                    } else {
                        tracing::debug!("Expiry sweep: nothing to purge");
                    }
                }
                Ok(Err(e)) => {
                    tracing::error!("Expiry sweep error: {}", e);
                }
                Err(e) => {
                    tracing::error!("Expiry sweep task join error: {}", e);
                }
            }
        }
    });
}
