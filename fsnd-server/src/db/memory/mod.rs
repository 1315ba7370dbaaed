//! In-memory repositories
//!
//! Used by `serve --in-memory` and by the router tests. Behaviour mirrors
//! the Postgres repositories, including ordering and not-found errors.

mod fyyur;
mod trivia;

pub use fyyur::MemoryFyyurRepo;
pub use trivia::MemoryTriviaRepo;
