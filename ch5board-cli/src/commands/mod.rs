//! Command implementations for the ch5board CLI

pub mod boards;
pub mod serve;
pub mod thread;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ch5board_core::BoardConfig;
use ch5board_server::db::{create_pool, run_migrations, BoardRepo};
use sqlx::SqlitePool;

pub use boards::run_boards;
pub use serve::run_serve;
pub use thread::run_thread;

/// Open the board database, creating schema and configured boards as needed.
pub(crate) async fn open_database(config: &BoardConfig, path_override: Option<&Path>) -> Result<SqlitePool> {
    let path: PathBuf = path_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.database.path.clone());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let pool = create_pool(&path, config.database.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    run_migrations(&pool)
        .await
        .context("Failed to create database schema")?;

    BoardRepo::new(&pool)
        .provision(&config.boards)
        .await
        .context("Failed to provision boards")?;

    tracing::debug!(path = %path.display(), "database ready");
    Ok(pool)
}
