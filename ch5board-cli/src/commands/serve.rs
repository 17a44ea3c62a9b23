//! HTTP server command

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ch5board_core::{BoardConfig, IdentityHasher};
use ch5board_server::http::{run_server, AppState, ServerConfig};
use clap::Parser;

use super::open_database;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:3030)
    #[arg(long, short = 'b', env = "CH5BOARD_BIND")]
    pub bind: Option<SocketAddr>,

    /// SQLite database file (overrides config)
    #[arg(long, env = "CH5BOARD_DATABASE")]
    pub database: Option<PathBuf>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

/// Run the HTTP server until Ctrl+C / SIGTERM
pub async fn run_serve(args: ServeArgs, config: BoardConfig) -> Result<()> {
    let server = ServerConfig {
        bind_addr: args.bind.unwrap_or(config.server.bind),
        cors_permissive: args.cors_permissive || config.server.cors_permissive,
    };

    let pool = open_database(&config, args.database.as_deref()).await?;

    tracing::info!(
        bind = %server.bind_addr,
        max_responses = config.posting.max_responses,
        boards = config.boards.len(),
        "Starting ch5board server"
    );

    let state = AppState::new(
        pool,
        config.posting,
        IdentityHasher::new(config.identity),
    );

    run_server(state, server).await.context("Server error")?;

    Ok(())
}
