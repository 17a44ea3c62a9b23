//! Board repository
//!
//! Boards are provisioned from configuration and never edited through the API:
//! - provision: INSERT with ON CONFLICT DO NOTHING (idempotent)
//! - list/get: JOIN with thread count (no N+1)

use ch5board_core::BoardSeed;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use super::DbError;

/// Board record with its thread count
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub thread_count: i64,
}

/// Board repository
pub struct BoardRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BoardRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert any configured board that does not exist yet.
    ///
    /// Existing rows are left untouched. Returns the number of boards created.
    pub async fn provision(&self, seeds: &[BoardSeed]) -> Result<u64, DbError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut created = 0;

        for seed in seeds {
            let result = sqlx::query(
                r#"
                INSERT INTO boards (id, name, category, description, created_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&seed.id)
            .bind(&seed.name)
            .bind(&seed.category)
            .bind(seed.description.as_deref())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            created += result.rows_affected();
        }

        tx.commit().await?;
        info!(configured = seeds.len(), created, "boards provisioned");
        Ok(created)
    }

    /// List boards ordered by category, then name.
    pub async fn list(&self) -> Result<Vec<Board>, DbError> {
        let boards = sqlx::query_as::<_, Board>(
            r#"
            SELECT
                b.id,
                b.name,
                b.category,
                b.description,
                b.created_at,
                COUNT(t.id) AS thread_count
            FROM boards b
            LEFT JOIN threads t ON t.board_id = b.id
            GROUP BY b.id
            ORDER BY b.category, b.name
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(boards)
    }

    /// Get a single board by id with thread count.
    pub async fn get(&self, id: &str) -> Result<Board, DbError> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT
                b.id,
                b.name,
                b.category,
                b.description,
                b.created_at,
                COUNT(t.id) AS thread_count
            FROM boards b
            LEFT JOIN threads t ON t.board_id = b.id
            WHERE b.id = ?
            GROUP BY b.id
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("board", id))
    }
}
