//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Handles conflicts via ON CONFLICT / UNIQUE (no check-then-insert)
//! - Uses transactions for multi-step operations

pub mod boards;
pub mod threads;
pub mod responses;

pub use boards::{Board, BoardRepo};
pub use threads::{Thread, ThreadDetail, ThreadRepo, ThreadSummary};
pub use responses::{Response, ResponseRepo, Submission};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("thread {id} is closed")]
    ThreadClosed { id: i64 },

    #[error("reply number conflict in thread {thread_id}")]
    SequenceConflict { thread_id: i64 },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// True when the error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
