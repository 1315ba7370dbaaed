//! Page errors rendered as HTML

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use super::pages::{NotFoundPage, ServerErrorPage};
use crate::db::repos::DbError;
use crate::models::ValidationError;

/// Failure while serving a page
#[derive(Debug)]
pub enum PageError {
    /// Missing record or unknown route (404 page)
    NotFound,

    /// Anything else (500 page, logged)
    Internal { message: String },
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        let rendered = match self {
            Self::NotFound => NotFoundPage::default().render(),
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                ServerErrorPage::default().render()
            }
        };

        match rendered {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("error page failed to render: {}", e);
                (status, status.canonical_reason().unwrap_or("error")).into_response()
            }
        }
    }
}

impl From<DbError> for PageError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { .. } => Self::NotFound,
            _ => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<askama::Error> for PageError {
    fn from(e: askama::Error) -> Self {
        Self::Internal {
            message: format!("template error: {e}"),
        }
    }
}

/// Why a form submission was not saved
///
/// Never shown to the user beyond a generic flash; only logged.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid form: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl SubmitError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Db(e) if e.is_not_found())
    }
}
