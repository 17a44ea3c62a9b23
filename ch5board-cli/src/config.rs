use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ch5board_core::BoardConfig;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file populated with the defaults
    Init(InitArgs),
    /// Print the effective configuration as TOML
    Show,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

/// Config file in use: `--config` / `CH5BOARD_CONFIG`, else ~/.ch5board/config.toml
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(BoardConfig::config_path)
}

/// Load the effective configuration.
pub fn load(explicit: Option<&Path>) -> Result<BoardConfig> {
    let path = resolve_path(explicit);
    BoardConfig::load(Some(&path))
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

pub fn run_config(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Init(init) => run_init(init, explicit),
        ConfigCommands::Show => run_show(explicit),
        ConfigCommands::Path => {
            println!("{}", resolve_path(explicit).display());
            Ok(())
        }
    }
}

fn run_init(args: InitArgs, explicit: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(explicit);

    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {}\n\nUse --force to overwrite",
            config_path.display()
        ));
    }

    BoardConfig::default()
        .save(&config_path)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    println!("Created config at: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit the config: $EDITOR {}", config_path.display());
    println!("  2. Change the [identity] salts before going public");
    println!("  3. Run: ch5board serve");

    Ok(())
}

fn run_show(explicit: Option<&Path>) -> Result<()> {
    let config = load(explicit)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
