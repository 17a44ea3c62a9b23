//! List provisioned boards

use std::path::PathBuf;

use anyhow::Result;
use ch5board_core::BoardConfig;
use ch5board_server::db::BoardRepo;
use clap::Parser;

use super::open_database;

#[derive(Parser, Debug)]
pub struct BoardsArgs {
    /// SQLite database file (overrides config)
    #[arg(long, env = "CH5BOARD_DATABASE")]
    pub database: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn run_boards(args: BoardsArgs, config: BoardConfig) -> Result<()> {
    let pool = open_database(&config, args.database.as_deref()).await?;
    let boards = BoardRepo::new(&pool).list().await?;
    pool.close().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&boards)?);
        return Ok(());
    }

    for board in boards {
        println!(
            "{:<12} {:<8} {:>5} threads  {}",
            board.id, board.category, board.thread_count, board.name
        );
    }
    Ok(())
}
