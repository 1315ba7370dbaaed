//! fsnd-core: configuration shared by the fsnd binaries.

pub mod config;

pub use config::{AppConfig, App, FsndConfig, LogConfig};
