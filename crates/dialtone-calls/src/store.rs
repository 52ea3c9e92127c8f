//! Persistence for the call log.
//!
//! Writes go through [`append_entry`], which inserts one row and reads back
//! the id and timestamp SQLite assigned in the same statement. Reads go
//! through [`list_entries`] (newest first, the `GET /call_logs` order) or
//! [`list_entries_for_call`] (oldest first, one call's history).
//!
//! There is no update or delete path: entries are immutable.

use dialtone_db::DbPool;
use dialtone_types::CallStatus;
use rusqlite::{params, types::Type, Connection, Row};
use serde::Serialize;

use crate::error::CallLogError;

/// One persisted status transition of a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallLogEntry {
    /// Row id, assigned by the store and increasing with insert order.
    pub id: i64,
    /// Caller-supplied call identifier.
    pub call_id: String,
    /// The status the call entered.
    pub status: CallStatus,
    /// UTC insert time, `YYYY-MM-DD HH:MM:SS.SSS`.
    pub timestamp: String,
}

impl CallLogEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let label: String = row.get(2)?;
        let status = label
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
        Ok(Self {
            id: row.get(0)?,
            call_id: row.get(1)?,
            status,
            timestamp: row.get(3)?,
        })
    }
}

/// Appends a status transition to the call log.
///
/// The row is committed when this returns.
///
/// # Errors
///
/// Returns `CallLogError::Database` on SQL failure.
pub fn append_entry(
    conn: &Connection,
    call_id: &str,
    status: CallStatus,
) -> Result<CallLogEntry, CallLogError> {
    let entry = conn.query_row(
        "INSERT INTO call_logs (call_id, status, timestamp)
         VALUES (?1, ?2, strftime('%Y-%m-%d %H:%M:%f', 'now'))
         RETURNING id, call_id, status, timestamp",
        params![call_id, status.as_str()],
        CallLogEntry::from_row,
    )?;
    Ok(entry)
}

/// Returns every entry, most recent first.
///
/// Entries written within the same millisecond fall back to id order so the
/// newest row still comes first.
///
/// # Errors
///
/// Returns `CallLogError::Database` on SQL failure.
pub fn list_entries(conn: &Connection) -> Result<Vec<CallLogEntry>, CallLogError> {
    let mut stmt = conn.prepare(
        "SELECT id, call_id, status, timestamp
         FROM call_logs
         ORDER BY timestamp DESC, id DESC",
    )?;
    let rows = stmt.query_map([], CallLogEntry::from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Returns one call's entries in the order they were written.
///
/// # Errors
///
/// Returns `CallLogError::Database` on SQL failure.
pub fn list_entries_for_call(
    conn: &Connection,
    call_id: &str,
) -> Result<Vec<CallLogEntry>, CallLogError> {
    let mut stmt = conn.prepare(
        "SELECT id, call_id, status, timestamp
         FROM call_logs
         WHERE call_id = ?1
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([call_id], CallLogEntry::from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Async handle to the call log.
///
/// Each operation checks a connection out of the pool and runs on tokio's
/// blocking pool, so callers on the async runtime never block on SQLite.
#[derive(Debug, Clone)]
pub struct CallLogStore {
    pool: DbPool,
}

impl CallLogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Appends a status transition. See [`append_entry`].
    pub async fn append(
        &self,
        call_id: &str,
        status: CallStatus,
    ) -> Result<CallLogEntry, CallLogError> {
        let pool = self.pool.clone();
        let call_id = call_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            append_entry(&conn, &call_id, status)
        })
        .await?
    }

    /// Every entry, newest first. See [`list_entries`].
    pub async fn list_all(&self) -> Result<Vec<CallLogEntry>, CallLogError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            list_entries(&conn)
        })
        .await?
    }

    /// One call's entries, oldest first. See [`list_entries_for_call`].
    pub async fn list_for_call(&self, call_id: &str) -> Result<Vec<CallLogEntry>, CallLogError> {
        let pool = self.pool.clone();
        let call_id = call_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            list_entries_for_call(&conn, &call_id)
        })
        .await?
    }
}
