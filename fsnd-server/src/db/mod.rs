//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections by default)
//! - List operations use JOINs - no N+1 queries
//! - Transactions for multi-step writes (record + genre links)
//! - Every repository has an in-memory twin with the same behavior

pub mod pool;
pub mod migrations;
pub mod repos;
pub mod memory;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
pub use memory::{MemoryFyyurRepo, MemoryTriviaRepo};
