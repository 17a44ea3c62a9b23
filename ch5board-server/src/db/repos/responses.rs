//! Response repository
//!
//! Reply submission is the one write path with business rules:
//! - the counter bump is a single `UPDATE ... RETURNING` and the first
//!   statement of the transaction, so SQLite's write lock serialises
//!   concurrent posters and each one receives a distinct number
//! - the bump only matches an active thread below the ceiling
//! - the row that reaches the ceiling flips the thread inactive
//! - `UNIQUE(thread_id, res_number)` backs the numbering at the storage level

use ch5board_core::PostingRules;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use super::{is_unique_violation, DbError};
use crate::models::{NewResponse, Pagination, Paginated, Poster};

/// Response as returned to clients. The stored address hash is not selected.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: i64,
    pub thread_id: i64,
    pub res_number: i64,
    pub name: String,
    pub mail: Option<String>,
    pub body: String,
    pub image_url: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a successful reply
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub response: Response,
    /// Thread reply count after this reply
    pub res_count: i64,
    /// False once this reply closed the thread
    pub thread_active: bool,
}

const RESPONSE_COLUMNS: &str =
    "id, thread_id, res_number, name, mail, body, image_url, user_id, created_at";

/// Insert one response row inside an open transaction.
pub(crate) async fn insert_response(
    conn: &mut SqliteConnection,
    thread_id: i64,
    res_number: i64,
    post: &NewResponse,
    poster: &Poster,
    now: DateTime<Utc>,
) -> Result<Response, DbError> {
    let sql = format!(
        r#"
        INSERT INTO responses
            (thread_id, res_number, name, mail, body, image_url, user_id, ip_hash, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {RESPONSE_COLUMNS}
        "#
    );

    sqlx::query_as::<_, Response>(&sql)
        .bind(thread_id)
        .bind(res_number)
        .bind(post.name.as_str())
        .bind(post.mail_str())
        .bind(post.body.as_str())
        .bind(post.image_url_str())
        .bind(&poster.user_id)
        .bind(&poster.ip_hash)
        .bind(now)
        .fetch_one(conn)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                warn!(thread_id, res_number, "reply number already taken");
                DbError::SequenceConflict { thread_id }
            } else {
                DbError::Sqlx(err)
            }
        })
}

/// Response repository
pub struct ResponseRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ResponseRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a reply to a thread.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the thread does not exist
    /// - `ThreadClosed` if the thread is inactive or already at the ceiling
    /// - `SequenceConflict` if the reply number is somehow taken
    ///
    /// No response row is written on error.
    pub async fn submit(
        &self,
        thread_id: i64,
        post: &NewResponse,
        poster: &Poster,
        rules: &PostingRules,
    ) -> Result<Submission, DbError> {
        let now = Utc::now();
        let sage = rules.is_bump_suppressed(post.mail_str());
        let ceiling = i64::from(rules.max_responses);

        let mut tx = self.pool.begin().await?;

        let bumped = sqlx::query(
            r#"
            UPDATE threads
            SET res_count = res_count + 1,
                updated_at = CASE WHEN ? THEN updated_at ELSE ? END,
                is_active = CASE WHEN res_count + 1 >= ? THEN 0 ELSE 1 END
            WHERE id = ? AND is_active = 1 AND res_count < ?
            RETURNING res_count, is_active
            "#,
        )
        .bind(sage)
        .bind(now)
        .bind(ceiling)
        .bind(thread_id)
        .bind(ceiling)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = bumped else {
            return self.reject(tx, thread_id, ceiling).await;
        };

        let res_count: i64 = row.try_get("res_count")?;
        let thread_active: bool = row.try_get("is_active")?;

        let response = insert_response(&mut *tx, thread_id, res_count, post, poster, now).await?;
        tx.commit().await?;

        debug!(thread_id, res_number = res_count, sage, "reply stored");
        if !thread_active {
            info!(thread_id, res_count, "thread reached reply ceiling and closed");
        }

        Ok(Submission {
            response,
            res_count,
            thread_active,
        })
    }

    // The bump matched nothing: tell a missing thread from a closed one.
    // A thread left active at or above the ceiling (the ceiling was lowered)
    // is closed here so it stops showing as open.
    async fn reject(
        &self,
        mut tx: sqlx::Transaction<'_, sqlx::Sqlite>,
        thread_id: i64,
        ceiling: i64,
    ) -> Result<Submission, DbError> {
        let state: Option<(bool, i64)> =
            sqlx::query_as("SELECT is_active, res_count FROM threads WHERE id = ?")
                .bind(thread_id)
                .fetch_optional(&mut *tx)
                .await?;

        match state {
            None => Err(DbError::not_found("thread", thread_id)),
            Some((true, res_count)) if res_count >= ceiling => {
                sqlx::query("UPDATE threads SET is_active = 0 WHERE id = ?")
                    .bind(thread_id)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;
                info!(thread_id, res_count, ceiling, "closed thread already over the ceiling");
                Err(DbError::ThreadClosed { id: thread_id })
            }
            Some((true, _)) => Err(DbError::SequenceConflict { thread_id }),
            Some((false, _)) => Err(DbError::ThreadClosed { id: thread_id }),
        }
    }

    /// Every response of a thread in reply order.
    pub async fn all_for_thread(&self, thread_id: i64) -> Result<Vec<Response>, DbError> {
        let sql = format!(
            "SELECT {RESPONSE_COLUMNS} FROM responses WHERE thread_id = ? ORDER BY res_number"
        );
        let responses = sqlx::query_as::<_, Response>(&sql)
            .bind(thread_id)
            .fetch_all(self.pool)
            .await?;
        Ok(responses)
    }

    /// One page of a thread's responses in reply order.
    pub async fn list_for_thread(
        &self,
        thread_id: i64,
        page: Pagination,
    ) -> Result<Paginated<Response>, DbError> {
        let total: Option<(i64,)> = sqlx::query_as("SELECT res_count FROM threads WHERE id = ?")
            .bind(thread_id)
            .fetch_optional(self.pool)
            .await?;
        let Some((total,)) = total else {
            return Err(DbError::not_found("thread", thread_id));
        };

        let sql = format!(
            r#"
            SELECT {RESPONSE_COLUMNS}
            FROM responses
            WHERE thread_id = ?
            ORDER BY res_number
            LIMIT ? OFFSET ?
            "#
        );
        let items = sqlx::query_as::<_, Response>(&sql)
            .bind(thread_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(page.wrap(items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::test_support::{open_thread, pool_with_board, poster};
    use crate::db::ThreadRepo;

    fn reply(mail: Option<&str>, rules: &PostingRules) -> NewResponse {
        NewResponse::new(Some("テスター"), mail, "レスです", None, rules).unwrap()
    }

    #[tokio::test]
    async fn reply_gets_next_number() {
        let pool = pool_with_board().await;
        let rules = PostingRules::default();
        let thread = open_thread(&pool, &rules, "numbering").await;
        let repo = ResponseRepo::new(&pool);

        let first = repo.submit(thread.id, &reply(None, &rules), &poster(), &rules).await.unwrap();
        let second = repo.submit(thread.id, &reply(None, &rules), &poster(), &rules).await.unwrap();

        assert_eq!(first.response.res_number, 2);
        assert_eq!(second.response.res_number, 3);
        assert_eq!(second.res_count, 3);
        assert!(second.thread_active);
        assert_eq!(ThreadRepo::new(&pool).get(thread.id).await.unwrap().res_count, 3);
    }

    #[tokio::test]
    async fn sage_keeps_updated_at() {
        let pool = pool_with_board().await;
        let rules = PostingRules::default();
        let thread = open_thread(&pool, &rules, "sage").await;
        let repo = ResponseRepo::new(&pool);

        repo.submit(thread.id, &reply(Some("SAGE"), &rules), &poster(), &rules)
            .await
            .unwrap();
        let after_sage = ThreadRepo::new(&pool).get(thread.id).await.unwrap();
        assert_eq!(after_sage.updated_at, thread.updated_at);
        assert_eq!(after_sage.res_count, 2);

        repo.submit(thread.id, &reply(Some("age"), &rules), &poster(), &rules)
            .await
            .unwrap();
        let after_age = ThreadRepo::new(&pool).get(thread.id).await.unwrap();
        assert!(after_age.updated_at > thread.updated_at);
    }

    #[tokio::test]
    async fn ceiling_closes_thread() {
        let pool = pool_with_board().await;
        let rules = PostingRules {
            max_responses: 3,
            ..PostingRules::default()
        };
        let thread = open_thread(&pool, &rules, "short").await;
        let repo = ResponseRepo::new(&pool);

        let second = repo.submit(thread.id, &reply(None, &rules), &poster(), &rules).await.unwrap();
        assert!(second.thread_active);

        let third = repo.submit(thread.id, &reply(None, &rules), &poster(), &rules).await.unwrap();
        assert_eq!(third.response.res_number, 3);
        assert!(!third.thread_active);

        let err = repo
            .submit(thread.id, &reply(None, &rules), &poster(), &rules)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ThreadClosed { id } if id == thread.id));

        let stored = ThreadRepo::new(&pool).get(thread.id).await.unwrap();
        assert_eq!(stored.res_count, 3);
        assert!(!stored.is_active);
        assert_eq!(repo.all_for_thread(thread.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn lowered_ceiling_closes_on_next_attempt() {
        let pool = pool_with_board().await;
        let rules = PostingRules::default();
        let thread = open_thread(&pool, &rules, "lowered").await;
        let repo = ResponseRepo::new(&pool);
        repo.submit(thread.id, &reply(None, &rules), &poster(), &rules).await.unwrap();

        let tighter = PostingRules {
            max_responses: 2,
            ..PostingRules::default()
        };
        let err = repo
            .submit(thread.id, &reply(None, &tighter), &poster(), &tighter)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ThreadClosed { .. }));
        assert!(!ThreadRepo::new(&pool).get(thread.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn missing_thread_is_not_found() {
        let pool = pool_with_board().await;
        let rules = PostingRules::default();
        let err = ResponseRepo::new(&pool)
            .submit(404, &reply(None, &rules), &poster(), &rules)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "thread", .. }));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM responses")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn response_json_has_no_ip_hash() {
        let pool = pool_with_board().await;
        let rules = PostingRules::default();
        let thread = open_thread(&pool, &rules, "privacy").await;
        let submission = ResponseRepo::new(&pool)
            .submit(thread.id, &reply(None, &rules), &poster(), &rules)
            .await
            .unwrap();

        let json = serde_json::to_string(&submission).unwrap();
        assert!(!json.contains("ipHash"));
        assert!(!json.contains("ip_hash"));
        assert!(!json.contains(&poster().ip_hash));
        assert!(json.contains("\"resNumber\":2"));
    }

    #[tokio::test]
    async fn list_for_thread_paginates_in_order() {
        let pool = pool_with_board().await;
        let rules = PostingRules::default();
        let thread = open_thread(&pool, &rules, "pages").await;
        let repo = ResponseRepo::new(&pool);
        for _ in 0..4 {
            repo.submit(thread.id, &reply(None, &rules), &poster(), &rules).await.unwrap();
        }

        let page = repo.list_for_thread(thread.id, Pagination::new(2, 2)).await.unwrap();
        let numbers: Vec<_> = page.items.iter().map(|r| r.res_number).collect();
        assert_eq!(numbers, vec![3, 4]);
        assert_eq!(page.total, 5);

        let err = repo.list_for_thread(999, Pagination::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
