//! fsnd CLI - Fyyur and Trivia web servers
//!
//! This is the main entry point for the fsnd command-line tool, which provides:
//! - `serve fyyur`: the venue/artist booking site (HTML)
//! - `serve trivia`: the trivia questions API (JSON)
//! - `migrate`: create tables and seed trivia categories
//! - `config`: inspect or initialize ~/.fsnd/config.toml

use anyhow::Result;
use clap::{Parser, Subcommand};

use fsnd_core::FsndConfig;

mod commands;
mod tracing_setup;

use commands::{ConfigArgs, MigrateArgs, ServeArgs};
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "fsnd",
    author,
    version,
    about = "Fyyur venue booking site and Trivia API servers"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Fyyur or Trivia HTTP server
    Serve(ServeArgs),
    /// Apply database migrations
    Migrate(MigrateArgs),
    /// Manage the config file
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // A broken config file only matters to commands that need it
    let config = FsndConfig::load();
    let (level, error_log) = match &config {
        Ok(c) => (c.log.level.clone(), c.log.file_path()),
        Err(_) => ("info".to_string(), None),
    };
    let serving = matches!(cli.command, Commands::Serve(_));
    let _log_guard = match tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        level,
        error_log: error_log.filter(|_| serving),
    }) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &config?).await?,
        Commands::Migrate(args) => commands::run_migrate(args, &config?).await?,
        Commands::Config(args) => commands::run_config(args)?,
    }
    Ok(())
}
