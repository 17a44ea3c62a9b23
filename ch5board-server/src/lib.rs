//! ch5board-server: bulletin board HTTP API
//!
//! Boards, threads and sequentially numbered responses stored in SQLite
//! and served over axum. Reply submission enforces the thread's reply
//! ceiling and "sage" bump suppression inside one write transaction.

pub mod db;
pub mod http;
pub mod models;

pub use db::{create_memory_pool, create_pool, run_migrations, DbError};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
