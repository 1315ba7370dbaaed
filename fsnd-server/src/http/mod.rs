//! HTTP layer
//!
//! Two routers share one server skeleton:
//! - `fyyur`: HTML pages with flash messages
//! - `trivia`: JSON API with CORS
//!
//! Both get request tracing and graceful shutdown.

pub mod server;
pub mod error;
pub mod extractors;
pub mod fyyur;
pub mod trivia;

pub use server::{run_server, ServerConfig, ServerError};
pub use error::ApiError;
