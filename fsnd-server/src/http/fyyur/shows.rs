//! Show pages

use std::sync::Arc;

use axum::{extract::State, response::Response, routing::get, Router};
use chrono::Utc;

use super::error::{PageError, SubmitError};
use super::flash::{self, redirect_with_flash, Flash};
use super::pages::{ShowCard, ShowFormPage, ShowsPage};
use super::FyyurState;
use crate::http::extractors::FormBody;
use crate::models::{FormData, Show, ShowDraft};

/// GET /shows - every show, earliest first
async fn list_shows(
    State(state): State<Arc<FyyurState>>,
    flash: Flash,
) -> Result<Response, PageError> {
    let shows = state.repo.list_shows().await?;
    let page = ShowsPage {
        flash: flash.text(),
        shows: shows.into_iter().map(ShowCard::from).collect(),
    };
    flash::render(&page, &flash)
}

/// GET /shows/create
async fn create_show_form(flash: Flash) -> Result<Response, PageError> {
    let page = ShowFormPage {
        flash: flash.text(),
        start_time: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };
    flash::render(&page, &flash)
}

async fn insert_show(state: &FyyurState, form: &FormData) -> Result<Show, SubmitError> {
    let draft = ShowDraft::from_form(form)?;
    Ok(state.repo.create_show(&draft).await?)
}

/// POST /shows/create
async fn create_show(State(state): State<Arc<FyyurState>>, FormBody(form): FormBody) -> Response {
    match insert_show(&state, &form).await {
        Ok(show) => {
            tracing::info!(
                show_id = show.id,
                venue_id = show.venue_id,
                artist_id = show.artist_id,
                "show listed"
            );
            redirect_with_flash("/shows", "Show was successfully listed!")
        }
        Err(e) => {
            tracing::warn!(error = %e, "show could not be listed");
            redirect_with_flash("/", "An error occurred. Show could not be listed.")
        }
    }
}

/// Show routes
pub fn router() -> Router<Arc<FyyurState>> {
    Router::new()
        .route("/shows", get(list_shows))
        .route("/shows/create", get(create_show_form).post(create_show))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::db::repos::FyyurRepo;
    use crate::http::fyyur::router;
    use crate::http::fyyur::test_support::*;

    #[tokio::test]
    async fn create_show_then_list() {
        let repo = Arc::new(MemoryFyyurRepo::new());
        let app = router(repo.clone());
        send(&app, post_form("/venues/create", HOP)).await;
        send(&app, post_form("/artists/create", PETALS)).await;

        let reply = send(
            &app,
            post_form(
                "/shows/create",
                "artist_id=1&venue_id=1&start_time=2035-04-01+20%3A00%3A00",
            ),
        )
        .await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location.as_deref(), Some("/shows"));
        assert_eq!(reply.flash.as_deref(), Some("Show was successfully listed!"));

        let reply = send(&app, get("/shows")).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("Sunday April, 1, 2035 at 8:00PM"));
        assert!(reply.body.contains("Guns N Petals"));
        assert!(reply.body.contains("The Musical Hop"));
    }

    #[tokio::test]
    async fn show_for_missing_artist_fails() {
        let repo = Arc::new(MemoryFyyurRepo::new());
        let app = router(repo.clone());
        send(&app, post_form("/venues/create", HOP)).await;

        let reply = send(
            &app,
            post_form("/shows/create", "artist_id=7&venue_id=1&start_time=2035-04-01T20%3A00"),
        )
        .await;
        assert_eq!(reply.location.as_deref(), Some("/"));
        assert_eq!(
            reply.flash.as_deref(),
            Some("An error occurred. Show could not be listed.")
        );
        assert!(repo.list_shows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_start_time_fails() {
        let app = router(Arc::new(MemoryFyyurRepo::new()));
        let reply = send(
            &app,
            post_form("/shows/create", "artist_id=1&venue_id=1&start_time=tomorrow"),
        )
        .await;
        assert_eq!(
            reply.flash.as_deref(),
            Some("An error occurred. Show could not be listed.")
        );
    }

    #[tokio::test]
    async fn show_form_prefills_start_time() {
        let app = router(Arc::new(MemoryFyyurRepo::new()));
        let reply = send(&app, get("/shows/create")).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("name=\"start_time\" value=\"20"));
    }
}
