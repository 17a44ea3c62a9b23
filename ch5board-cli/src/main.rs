//! ch5board CLI - anonymous bulletin board server
//!
//! Entry point for the `ch5board` binary:
//! - `serve` runs the HTTP API over a SQLite file
//! - `boards` / `thread` inspect the same database from the terminal
//! - `config` manages ~/.ch5board/config.toml

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "ch5board",
    author,
    version,
    about = "Anonymous threaded bulletin board with numbered replies",
    long_about = "Serve a 5ch-style bulletin board over HTTP. Threads close at their reply \
                  ceiling and replies with \"sage\" in the mail field do not bump the thread."
)]
struct Cli {
    /// Config file (default: ~/.ch5board/config.toml)
    #[arg(long, global = true, env = "CH5BOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the telemetry feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// List provisioned boards
    Boards(commands::boards::BoardsArgs),
    /// Print a thread with its responses
    Thread(commands::thread::ThreadArgs),
    /// Manage ch5board configuration (init, show, path)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })?;

    let result = run(cli).await;
    tracing_setup::shutdown_otel();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config::load(config_path)?).await,
        Commands::Boards(args) => commands::run_boards(args, config::load(config_path)?).await,
        Commands::Thread(args) => commands::run_thread(args, config::load(config_path)?).await,
        Commands::Config(args) => config::run_config(args, config_path),
        Commands::Completions(args) => run_completions(args),
    }
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
