//! Database connection pool management
//!
//! Uses sqlx SqlitePool with explicit connection limits. The pool is
//! created once by the caller and handed to the router; there is no
//! global handle.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::debug;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a writer waits for the database lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if needed) a file-backed SQLite pool.
///
/// The journal runs in WAL mode so readers never block the single writer.
/// Writers queue on the database lock for up to five seconds.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(Path::new("board.db"), 5).await?;
/// ```
pub async fn create_pool(path: &Path, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);

    debug!(path = %path.display(), max_connections, "opening sqlite pool");

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await
}

/// In-memory pool for tests and throwaway runs.
///
/// Every SQLite connection to `:memory:` is its own database, so the pool
/// is pinned to one connection that is never recycled.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}
