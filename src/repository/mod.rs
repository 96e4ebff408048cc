//! Repository layer for SQLite persistence.

mod job;

pub use job::{JobRepository, DEFAULT_SCOPE};

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// Storage failures. Fatal to an ingestion run; the caller decides whether
/// to re-run discovery.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("duplicate job id {0}")]
    DuplicateId(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub(crate) fn connect(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

/// Parse a datetime column, defaulting to the Unix epoch on error.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

pub(crate) fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}
