//! Schema creation, run once at startup

use sqlx::SqlitePool;
use tracing::info;

use super::DbError;

const SCHEMA: &[(&str, &str)] = &[
    (
        "boards",
        r#"
        CREATE TABLE IF NOT EXISTS boards (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "threads",
        r#"
        CREATE TABLE IF NOT EXISTS threads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            board_id TEXT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            res_count INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    ),
    (
        "responses",
        r#"
        CREATE TABLE IF NOT EXISTS responses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            thread_id INTEGER NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
            res_number INTEGER NOT NULL,
            name TEXT NOT NULL,
            mail TEXT,
            body TEXT NOT NULL,
            image_url TEXT,
            user_id TEXT NOT NULL,
            ip_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (thread_id, res_number)
        )
        "#,
    ),
    (
        "idx_threads_board_id",
        "CREATE INDEX IF NOT EXISTS idx_threads_board_id ON threads(board_id)",
    ),
    (
        "idx_threads_updated_at",
        "CREATE INDEX IF NOT EXISTS idx_threads_updated_at ON threads(updated_at)",
    ),
    (
        "idx_responses_thread_id",
        "CREATE INDEX IF NOT EXISTS idx_responses_thread_id ON responses(thread_id)",
    ),
];

/// Create tables and indexes if they do not exist yet.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    for (name, sql) in SCHEMA {
        sqlx::query(sql).execute(pool).await.map_err(|source| {
            tracing::error!(object = *name, error = %source, "migration failed");
            DbError::Sqlx(source)
        })?;
    }

    info!("database migrations complete");
    Ok(())
}
