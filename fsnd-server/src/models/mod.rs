//! Domain models with validation at construction
//!
//! Form and JSON input is validated when building the draft types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod pagination;
pub mod datetime;
pub mod form;
pub mod fyyur;
pub mod trivia;

pub use validation::ValidationError;
pub use pagination::{PageParams, Paginated, Pagination, QUESTIONS_PER_PAGE};
pub use datetime::{format_datetime, parse_start_time, DateFormat};
pub use form::FormData;
pub use fyyur::{
    Area, Artist, ArtistDraft, Genre, Show, ShowDraft, ShowListing, Summary, Venue, VenueDraft,
};
pub use trivia::{Category, LooseInt, NewQuestion, Question};
