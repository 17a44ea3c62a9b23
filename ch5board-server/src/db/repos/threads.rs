//! Thread repository
//!
//! Handles thread lifecycle with:
//! - Atomic creation with the opening post (transaction)
//! - Sorted, paginated listing with momentum
//! - Detail view with every response in reply order

use ch5board_core::{momentum, PostingRules};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::info;

use super::responses::{insert_response, Response, ResponseRepo};
use super::DbError;
use crate::models::{BoardId, NewResponse, Pagination, Paginated, Poster, ThreadSort, ThreadTitle};

/// Thread record from database
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: i64,
    pub board_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub res_count: i64,
    pub is_active: bool,
}

/// Thread as shown in a board listing
#[derive(Debug, Clone, Serialize)]
pub struct ThreadSummary {
    #[serde(flatten)]
    pub thread: Thread,
    /// Replies per day since creation
    pub momentum: f64,
}

/// Thread with its board name and all responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDetail {
    #[serde(flatten)]
    pub thread: Thread,
    pub board_name: String,
    pub responses: Vec<Response>,
}

/// Thread repository
pub struct ThreadRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ThreadRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a thread together with response #1 (atomic).
    ///
    /// The thread row is inserted only if the board exists, so the
    /// transaction opens with a write and a missing board leaves no trace.
    pub async fn create_with_opening_post(
        &self,
        board: &BoardId,
        title: &ThreadTitle,
        post: &NewResponse,
        poster: &Poster,
        rules: &PostingRules,
    ) -> Result<Thread, DbError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let thread = sqlx::query_as::<_, Thread>(
            r#"
            INSERT INTO threads (board_id, title, created_at, updated_at, res_count, is_active)
            SELECT ?, ?, ?, ?, 1, ?
            WHERE EXISTS (SELECT 1 FROM boards WHERE id = ?)
            RETURNING id, board_id, title, created_at, updated_at, res_count, is_active
            "#,
        )
        .bind(board.as_str())
        .bind(title.as_str())
        .bind(now)
        .bind(now)
        .bind(rules.max_responses > 1)
        .bind(board.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("board", board.as_str()))?;

        insert_response(&mut *tx, thread.id, 1, post, poster, now).await?;

        tx.commit().await?;
        info!(thread_id = thread.id, board = %board.as_str(), "thread created");
        Ok(thread)
    }

    /// List threads for a board, sorted and paginated, with momentum.
    pub async fn list_for_board(
        &self,
        board_id: &str,
        sort: ThreadSort,
        page: Pagination,
    ) -> Result<Paginated<ThreadSummary>, DbError> {
        let (board_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM boards WHERE id = ?)")
                .bind(board_id)
                .fetch_one(self.pool)
                .await?;

        if !board_exists {
            return Err(DbError::not_found("board", board_id));
        }

        let sql = format!(
            r#"
            SELECT
                t.id,
                t.board_id,
                t.title,
                t.created_at,
                t.updated_at,
                t.res_count,
                t.is_active,
                COUNT(*) OVER() AS total
            FROM threads t
            WHERE t.board_id = ?
            ORDER BY {}
            LIMIT ? OFFSET ?
            "#,
            sort.order_by()
        );

        let rows = sqlx::query(&sql)
            .bind(board_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total = match rows.first() {
            Some(row) => row.try_get::<i64, _>("total")?,
            None => self.count_for_board(board_id).await?,
        };

        let now = Utc::now();
        let items = rows
            .iter()
            .map(|row| {
                let thread = Thread::from_row(row)?;
                Ok(ThreadSummary {
                    momentum: momentum(thread.created_at, thread.res_count, now),
                    thread,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(page.wrap(items, total))
    }

    // Only reached when the requested page is past the end.
    async fn count_for_board(&self, board_id: &str) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM threads WHERE board_id = ?")
            .bind(board_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Get a single thread by ID.
    pub async fn get(&self, id: i64) -> Result<Thread, DbError> {
        sqlx::query_as::<_, Thread>(
            r#"
            SELECT id, board_id, title, created_at, updated_at, res_count, is_active
            FROM threads
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("thread", id))
    }

    /// Thread plus board name and every response ordered by reply number.
    pub async fn detail(&self, id: i64) -> Result<ThreadDetail, DbError> {
        let row = sqlx::query(
            r#"
            SELECT
                t.id,
                t.board_id,
                t.title,
                t.created_at,
                t.updated_at,
                t.res_count,
                t.is_active,
                b.name AS board_name
            FROM threads t
            JOIN boards b ON b.id = t.board_id
            WHERE t.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("thread", id))?;

        let thread = Thread::from_row(&row)?;
        let board_name: String = row.try_get("board_name")?;
        let responses = ResponseRepo::new(self.pool).all_for_thread(id).await?;

        Ok(ThreadDetail {
            thread,
            board_name,
            responses,
        })
    }
}
