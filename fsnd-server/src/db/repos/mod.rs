//! Repository traits and their Postgres implementations
//!
//! Handlers only see `dyn FyyurRepo` / `dyn TriviaRepo`, so the same
//! router runs against Postgres or the in-memory store.

pub mod fyyur;
pub mod trivia;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    Artist, ArtistDraft, Category, NewQuestion, Paginated, Pagination, Question, Show,
    ShowDraft, ShowListing, Summary, Venue, VenueDraft,
};

pub use fyyur::PgFyyurRepo;
pub use trivia::PgTriviaRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Storage for venues, artists, genres and shows
#[async_trait]
pub trait FyyurRepo: Send + Sync {
    /// Venues ordered by state, city and name, each with its count of
    /// shows starting after `now`. `search` filters names by
    /// case-insensitive substring.
    async fn venue_summaries(
        &self,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Summary>, DbError>;
    async fn get_venue(&self, id: i32) -> Result<Venue, DbError>;
    async fn create_venue(&self, draft: &VenueDraft) -> Result<Venue, DbError>;
    async fn update_venue(&self, id: i32, draft: &VenueDraft) -> Result<Venue, DbError>;
    /// Delete a venue and its shows, returning the removed record
    async fn delete_venue(&self, id: i32) -> Result<Venue, DbError>;

    /// Artists ordered by name; see `venue_summaries`.
    async fn artist_summaries(
        &self,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Summary>, DbError>;
    async fn get_artist(&self, id: i32) -> Result<Artist, DbError>;
    async fn create_artist(&self, draft: &ArtistDraft) -> Result<Artist, DbError>;
    async fn update_artist(&self, id: i32, draft: &ArtistDraft) -> Result<Artist, DbError>;

    /// Every show ordered by start time
    async fn list_shows(&self) -> Result<Vec<ShowListing>, DbError>;
    async fn shows_for_venue(&self, venue_id: i32) -> Result<Vec<ShowListing>, DbError>;
    async fn shows_for_artist(&self, artist_id: i32) -> Result<Vec<ShowListing>, DbError>;
    /// Fails with `NotFound` unless both the venue and the artist exist
    async fn create_show(&self, draft: &ShowDraft) -> Result<Show, DbError>;

}

/// Storage for trivia categories and questions
#[async_trait]
pub trait TriviaRepo: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, DbError>;
    async fn get_category(&self, id: i32) -> Result<Category, DbError>;
    /// One page of questions ordered by id, optionally within a category
    async fn list_questions(
        &self,
        category: Option<i32>,
        page: Pagination,
    ) -> Result<Paginated<Question>, DbError>;
    async fn all_questions(&self) -> Result<Vec<Question>, DbError>;
    /// Questions not in `exclude`, optionally within a category
    async fn quiz_candidates(
        &self,
        category: Option<i32>,
        exclude: &[i32],
    ) -> Result<Vec<Question>, DbError>;
    /// Fails with `NotFound` when the category does not exist
    async fn create_question(&self, question: &NewQuestion) -> Result<Question, DbError>;
    async fn delete_question(&self, id: i32) -> Result<Question, DbError>;
}

/// Escape LIKE metacharacters so search terms match literally
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Hop"), "%Hop%");
        assert_eq!(like_pattern(" 100% _live_ "), "%100\\% \\_live\\_%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn not_found_helper() {
        let err = DbError::not_found("venue", 7);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: venue '7'");
    }
}
