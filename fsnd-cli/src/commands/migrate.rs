//! Database migration command

use anyhow::{Context, Result};
use clap::Parser;

use fsnd_core::FsndConfig;
use fsnd_server::db::{create_pool_with_options, migrations};

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Create the Fyyur and Trivia tables and seed the trivia categories
pub async fn run_migrate(args: MigrateArgs, config: &FsndConfig) -> Result<()> {
    let database_url = args
        .database_url
        .unwrap_or_else(|| config.database_url.clone());

    let pool = create_pool_with_options(&database_url, config.max_connections)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    println!("Migrations applied");
    Ok(())
}
