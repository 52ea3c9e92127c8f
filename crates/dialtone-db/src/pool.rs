//! Connection pool creation and configuration.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;

use crate::migrations::{run_migrations, MigrationError};

/// Path that selects a private in-memory database.
const IN_MEMORY: &str = ":memory:";

/// Runtime tunables for SQLite connection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// Busy timeout for SQLite connections, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled SQLite connections.
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
        }
    }
}

/// A type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors that can occur when creating the database pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Failed to build the connection pool.
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),
}

/// Errors from [`open_database`].
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// No connection could be checked out to run migrations.
    #[error("failed to get database connection: {0}")]
    Connection(#[from] r2d2::Error),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Creates a SQLite connection pool with WAL mode, foreign keys and a busy
/// timeout configured on every connection.
///
/// `:memory:` opens a private in-memory database per connection, so the pool
/// is capped at a single connection in that case; otherwise writes made on
/// one connection would be invisible to the others.
///
/// # Errors
///
/// Returns `PoolError::PoolInit` if the connection pool cannot be created.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let busy_timeout_ms = settings.busy_timeout_ms;
    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(flags)
        .with_init(move |conn| {
            // In-memory databases report "memory", which is fine.
            let journal_mode: String =
                conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
            if journal_mode != "wal" && journal_mode != "memory" {
                return Err(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                    Some(format!(
                        "failed to set WAL journal mode, got: {journal_mode}"
                    )),
                ));
            }
            conn.execute_batch(&format!(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = {busy_timeout_ms};"
            ))
        });

    let builder = if db_path == IN_MEMORY {
        // Recycling the only connection would silently drop the database.
        Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        Pool::builder().max_size(settings.pool_max_size.max(1))
    };

    let pool = builder.build(manager)?;

    Ok(pool)
}

/// Opens the database at `db_path` and brings its schema up to date.
///
/// This is what the server runs once at startup.
///
/// # Errors
///
/// Returns `DbError` if the pool cannot be built, no connection can be
/// obtained, or a migration fails.
pub fn open_database(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, DbError> {
    let pool = create_pool(db_path, settings)?;
    {
        let conn = pool.get()?;
        let applied = run_migrations(&conn)?;
        if applied > 0 {
            tracing::info!(count = applied, path = db_path, "applied database migrations");
        }
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_pool_applies_settings() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("calls.db");
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 2_500,
            pool_max_size: 3,
        };

        let pool = create_pool(path.to_str().unwrap(), settings).expect("pool should build");
        let conn = pool.get().expect("should get a connection");

        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .expect("should query journal_mode");
        assert_eq!(mode, "wal");

        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .expect("should query foreign_keys");
        assert_eq!(fk, 1);

        let busy_timeout: i32 = conn
            .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
            .expect("should query busy_timeout");
        assert_eq!(busy_timeout, 2_500);

        assert_eq!(pool.max_size(), 3);
    }

    #[test]
    fn in_memory_pool_is_single_connection() {
        let pool = create_pool(IN_MEMORY, DbRuntimeSettings::default())
            .expect("pool creation should succeed");
        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn open_database_creates_schema_once() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("calls.db");
        let path = path.to_str().unwrap();

        let pool = open_database(path, DbRuntimeSettings::default()).expect("first open");
        drop(pool);
        let pool = open_database(path, DbRuntimeSettings::default()).expect("second open");

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM call_logs", [], |row| row.get(0))
            .expect("call_logs should exist");
        assert_eq!(count, 0);
    }
}
