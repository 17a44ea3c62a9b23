//! Print one thread with all of its responses

use std::path::PathBuf;

use anyhow::Result;
use ch5board_core::BoardConfig;
use ch5board_server::db::{Response, ThreadRepo};
use clap::Parser;

use super::open_database;

#[derive(Parser, Debug)]
pub struct ThreadArgs {
    /// Thread id
    pub id: i64,

    /// SQLite database file (overrides config)
    #[arg(long, env = "CH5BOARD_DATABASE")]
    pub database: Option<PathBuf>,

    /// Print JSON instead of the board layout
    #[arg(long)]
    pub json: bool,
}

pub async fn run_thread(args: ThreadArgs, config: BoardConfig) -> Result<()> {
    let pool = open_database(&config, args.database.as_deref()).await?;
    let detail = ThreadRepo::new(&pool).detail(args.id).await?;
    pool.close().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let status = if detail.thread.is_active { "" } else { " [closed]" };
    println!(
        "【{}】{} ({}){}",
        detail.board_name, detail.thread.title, detail.thread.res_count, status
    );
    println!();
    for response in &detail.responses {
        print!("{}", format_response(response));
    }
    Ok(())
}

/// `N ：name [mail]：YYYY/MM/DD HH:MM:SS ID:xxxxxxxx` followed by the indented body.
fn format_response(response: &Response) -> String {
    let mail = response
        .mail
        .as_deref()
        .map(|m| format!(" [{m}]"))
        .unwrap_or_default();

    let mut out = format!(
        "{} ：{}{}：{} ID:{}\n",
        response.res_number,
        response.name,
        mail,
        response.created_at.format("%Y/%m/%d %H:%M:%S"),
        response.user_id
    );
    for line in response.body.lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    if let Some(url) = &response.image_url {
        out.push_str(&format!("    {url}\n"));
    }
    out.push('\n');
    out
}
