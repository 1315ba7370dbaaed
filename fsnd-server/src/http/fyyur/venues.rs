//! Venue pages

use std::sync::Arc;

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use super::error::{PageError, SubmitError};
use super::flash::{self, flash_cookie, redirect_with_flash, Flash};
use super::pages::{ProfileForm, SearchPage, ShowSplit, VenueFormPage, VenuePage, VenuesPage};
use super::{FyyurState, RecordId};
use crate::http::error::ApiError;
use crate::http::extractors::{FormBody, IdPath};
use crate::models::fyyur::group_by_area;
use crate::models::{FormData, Venue, VenueDraft};

/// GET /venues - venues grouped by city and state
async fn list_venues(
    State(state): State<Arc<FyyurState>>,
    flash: Flash,
) -> Result<Response, PageError> {
    let summaries = state.repo.venue_summaries(None, Utc::now()).await?;
    let page = VenuesPage {
        flash: flash.text(),
        areas: group_by_area(summaries),
    };
    flash::render(&page, &flash)
}

/// POST /venues/search
async fn search_venues(
    State(state): State<Arc<FyyurState>>,
    flash: Flash,
    FormBody(form): FormBody,
) -> Result<Response, PageError> {
    let search_term = form.text("search_term").trim().to_string();
    let results = state
        .repo
        .venue_summaries(Some(&search_term), Utc::now())
        .await?;

    let page = SearchPage {
        flash: flash.text(),
        kind: "venues",
        search_term,
        count: results.len(),
        results,
    };
    flash::render(&page, &flash)
}

/// GET /venues/{id}
async fn show_venue(
    State(state): State<Arc<FyyurState>>,
    flash: Flash,
    RecordId(id): RecordId,
) -> Result<Response, PageError> {
    let venue = state.repo.get_venue(id).await?;
    let shows = state.repo.shows_for_venue(id).await?;

    let page = VenuePage {
        flash: flash.text(),
        venue: venue.into(),
        shows: ShowSplit::new(shows, Utc::now()),
    };
    flash::render(&page, &flash)
}

/// GET /venues/create
async fn create_venue_form(flash: Flash) -> Result<Response, PageError> {
    let page = VenueFormPage {
        flash: flash.text(),
        heading: "List a new venue".to_string(),
        action: "/venues/create".to_string(),
        form: ProfileForm::default(),
    };
    flash::render(&page, &flash)
}

async fn insert_venue(state: &FyyurState, form: &FormData) -> Result<Venue, SubmitError> {
    let draft = VenueDraft::from_form(form)?;
    Ok(state.repo.create_venue(&draft).await?)
}

/// POST /venues/create
async fn create_venue(State(state): State<Arc<FyyurState>>, FormBody(form): FormBody) -> Response {
    match insert_venue(&state, &form).await {
        Ok(venue) => {
            tracing::info!(venue_id = venue.id, "venue listed");
            redirect_with_flash(
                "/venues",
                &format!("Venue {} was successfully listed!", venue.name),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "venue could not be listed");
            redirect_with_flash(
                "/",
                &format!(
                    "An error occurred. Venue {} could not be listed.",
                    form.text("name").trim()
                ),
            )
        }
    }
}

/// GET /venues/{id}/edit - form prefilled from the record
async fn edit_venue_form(
    State(state): State<Arc<FyyurState>>,
    flash: Flash,
    RecordId(id): RecordId,
) -> Result<Response, PageError> {
    let venue = state.repo.get_venue(id).await?;

    let page = VenueFormPage {
        flash: flash.text(),
        heading: format!("Edit venue {}", venue.name),
        action: format!("/venues/{id}/edit"),
        form: ProfileForm::from(&venue),
    };
    flash::render(&page, &flash)
}

async fn save_venue(state: &FyyurState, id: i32, form: &FormData) -> Result<Venue, SubmitError> {
    let draft = VenueDraft::from_form(form)?;
    Ok(state.repo.update_venue(id, &draft).await?)
}

/// POST /venues/{id}/edit
async fn edit_venue(
    State(state): State<Arc<FyyurState>>,
    RecordId(id): RecordId,
    FormBody(form): FormBody,
) -> Result<Response, PageError> {
    let target = format!("/venues/{id}");
    match save_venue(&state, id, &form).await {
        Ok(venue) => {
            tracing::info!(venue_id = venue.id, "venue updated");
            Ok(redirect_with_flash(
                &target,
                &format!("Venue {} was successfully updated!", venue.name),
            ))
        }
        Err(e) if e.is_not_found() => Err(PageError::NotFound),
        Err(e) => {
            tracing::warn!(venue_id = id, error = %e, "venue could not be updated");
            Ok(redirect_with_flash(
                &target,
                &format!(
                    "An error occurred. Venue {} could not be updated.",
                    form.text("name").trim()
                ),
            ))
        }
    }
}

/// DELETE /venues/{id} - called from the venue page; the client follows
/// `redirect` and the flash is shown there
async fn delete_venue(
    State(state): State<Arc<FyyurState>>,
    IdPath(id): IdPath,
) -> Response {
    match state.repo.delete_venue(id).await {
        Ok(venue) => {
            tracing::info!(venue_id = venue.id, "venue deleted");
            let message = format!("Venue {} successfully deleted.", venue.name);
            (
                AppendHeaders([(SET_COOKIE, flash_cookie(&message))]),
                Json(json!({ "success": true, "redirect": "/" })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(venue_id = id, error = %e, "venue could not be deleted");
            let message = format!("An error occurred. Venue with id {id} could not be deleted.");
            (
                AppendHeaders([(SET_COOKIE, flash_cookie(&message))]),
                ApiError::from(e),
            )
                .into_response()
        }
    }
}

/// Venue routes
pub fn router() -> Router<Arc<FyyurState>> {
    Router::new()
        .route("/venues", get(list_venues))
        .route("/venues/search", post(search_venues))
        .route("/venues/create", get(create_venue_form).post(create_venue))
        .route("/venues/{id}", get(show_venue).delete(delete_venue))
        .route("/venues/{id}/edit", get(edit_venue_form).post(edit_venue))
}
