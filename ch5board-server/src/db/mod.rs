//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections) injected into the router state
//! - All list operations use JOINs - no N+1 queries
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Write transactions start with the write, never with a read

pub mod migrations;
pub mod pool;
pub mod repos;

pub use migrations::run_migrations;
pub use pool::{create_memory_pool, create_pool};
pub use repos::*;
