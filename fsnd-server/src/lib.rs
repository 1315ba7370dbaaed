//! fsnd-server: HTTP servers for the Fyyur venue site and the Trivia API
//!
//! Both applications share one database layer (Postgres or in-memory)
//! and one server skeleton; each exposes its own axum router.

pub mod db;
pub mod http;
pub mod models;

pub use db::{create_pool, create_pool_with_options, DbError, FyyurRepo, TriviaRepo};
pub use http::{fyyur, run_server, trivia, ServerConfig, ServerError};
