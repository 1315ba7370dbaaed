//! HTTP server command
//!
//! Runs either application on Postgres (migrating first) or on the
//! in-memory store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use clap::{Parser, ValueEnum};

use fsnd_core::{App, FsndConfig};
use fsnd_server::db::{
    create_pool_with_options, migrations, MemoryFyyurRepo, MemoryTriviaRepo, PgFyyurRepo,
    PgTriviaRepo,
};
use fsnd_server::http::{fyyur, run_server, trivia, ServerConfig};

/// Which application to serve
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppName {
    /// Venue and artist listings (HTML)
    Fyyur,
    /// Trivia questions API (JSON)
    Trivia,
}

impl From<AppName> for App {
    fn from(name: AppName) -> Self {
        match name {
            AppName::Fyyur => App::Fyyur,
            AppName::Trivia => App::Trivia,
        }
    }
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Application to run
    #[arg(value_enum)]
    pub app: AppName,

    /// Address to bind to (default from config: fyyur 127.0.0.1:5000, trivia 127.0.0.1:5001)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep all data in memory instead of Postgres (lost on exit).
    /// Takes precedence over any database URL, including DATABASE_URL.
    #[arg(long)]
    pub in_memory: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: &FsndConfig) -> Result<()> {
    let app = App::from(args.app);
    let bind = args.bind.unwrap_or(config.app(app).bind);

    let router = if args.in_memory {
        tracing::warn!("Serving {} from memory; data is lost on exit", app);
        memory_router(app)
    } else {
        let database_url = args
            .database_url
            .clone()
            .unwrap_or_else(|| config.database_url_for(app).to_string());
        postgres_router(app, &database_url, config.max_connections).await?
    };

    tracing::info!("Starting {} on {}", app, bind);
    run_server(router, ServerConfig { bind_addr: bind })
        .await
        .context("Server error")?;

    Ok(())
}

fn memory_router(app: App) -> Router {
    match app {
        App::Fyyur => fyyur::router(Arc::new(MemoryFyyurRepo::new())),
        App::Trivia => trivia::router(Arc::new(MemoryTriviaRepo::with_default_categories())),
    }
}

async fn postgres_router(app: App, database_url: &str, max_connections: u32) -> Result<Router> {
    let pool = create_pool_with_options(database_url, max_connections)
        .await
        .context("Failed to create database pool")?;

    let router = match app {
        App::Fyyur => {
            migrations::run_fyyur(&pool)
                .await
                .context("Failed to run Fyyur migrations")?;
            fyyur::router(Arc::new(PgFyyurRepo::new(pool)))
        }
        App::Trivia => {
            migrations::run_trivia(&pool)
                .await
                .context("Failed to run Trivia migrations")?;
            trivia::router(Arc::new(PgTriviaRepo::new(pool)))
        }
    };
    Ok(router)
}
