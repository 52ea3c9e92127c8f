//! Database layer for Dialtone.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization
//! and embedded SQL migrations. The call log table is created through the
//! migrations in this crate; the queries against it live next to the call
//! simulator in `dialtone-calls`.
//!
//! SQLite serialises writers itself, so concurrently running call
//! simulators share one pool without any application-level locking. WAL mode
//! keeps `GET /call_logs` readers from blocking on those writers.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, open_database, DbError, DbPool, DbRuntimeSettings, PoolError};
