//! Artist pages

use std::sync::Arc;

use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Utc;

use super::error::{PageError, SubmitError};
use super::flash::{self, redirect_with_flash, Flash};
use super::pages::{ArtistFormPage, ArtistPage, ArtistsPage, ProfileForm, SearchPage, ShowSplit};
use super::{FyyurState, RecordId};
use crate::http::extractors::FormBody;
use crate::models::{Artist, ArtistDraft, FormData};

/// GET /artists
async fn list_artists(
    State(state): State<Arc<FyyurState>>,
    flash: Flash,
) -> Result<Response, PageError> {
    let artists = state.repo.artist_summaries(None, Utc::now()).await?;
    let page = ArtistsPage {
        flash: flash.text(),
        artists,
    };
    flash::render(&page, &flash)
}

/// POST /artists/search
async fn search_artists(
    State(state): State<Arc<FyyurState>>,
    flash: Flash,
    FormBody(form): FormBody,
) -> Result<Response, PageError> {
    let search_term = form.text("search_term").trim().to_string();
    let results = state
        .repo
        .artist_summaries(Some(&search_term), Utc::now())
        .await?;

    let page = SearchPage {
        flash: flash.text(),
        kind: "artists",
        search_term,
        count: results.len(),
        results,
    };
    flash::render(&page, &flash)
}

/// GET /artists/{id}
async fn show_artist(
    State(state): State<Arc<FyyurState>>,
    flash: Flash,
    RecordId(id): RecordId,
) -> Result<Response, PageError> {
    let artist = state.repo.get_artist(id).await?;
    let shows = state.repo.shows_for_artist(id).await?;

    let page = ArtistPage {
        flash: flash.text(),
        artist: artist.into(),
        shows: ShowSplit::new(shows, Utc::now()),
    };
    flash::render(&page, &flash)
}

/// GET /artists/create
async fn create_artist_form(flash: Flash) -> Result<Response, PageError> {
    let page = ArtistFormPage {
        flash: flash.text(),
        heading: "List a new artist".to_string(),
        action: "/artists/create".to_string(),
        form: ProfileForm::default(),
    };
    flash::render(&page, &flash)
}

async fn insert_artist(state: &FyyurState, form: &FormData) -> Result<Artist, SubmitError> {
    let draft = ArtistDraft::from_form(form)?;
    Ok(state.repo.create_artist(&draft).await?)
}

/// POST /artists/create
async fn create_artist(
    State(state): State<Arc<FyyurState>>,
    FormBody(form): FormBody,
) -> Response {
    match insert_artist(&state, &form).await {
        Ok(artist) => {
            tracing::info!(artist_id = artist.id, "artist listed");
            redirect_with_flash(
                "/artists",
                &format!("Artist {} was successfully listed!", artist.name),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "artist could not be listed");
            redirect_with_flash(
                "/",
                &format!(
                    "An error occurred. Artist {} could not be listed.",
                    form.text("name").trim()
                ),
            )
        }
    }
}

/// GET /artists/{id}/edit
async fn edit_artist_form(
    State(state): State<Arc<FyyurState>>,
    flash: Flash,
    RecordId(id): RecordId,
) -> Result<Response, PageError> {
    let artist = state.repo.get_artist(id).await?;

    let page = ArtistFormPage {
        flash: flash.text(),
        heading: format!("Edit artist {}", artist.name),
        action: format!("/artists/{id}/edit"),
        form: ProfileForm::from(&artist),
    };
    flash::render(&page, &flash)
}

async fn save_artist(state: &FyyurState, id: i32, form: &FormData) -> Result<Artist, SubmitError> {
    let draft = ArtistDraft::from_form(form)?;
    Ok(state.repo.update_artist(id, &draft).await?)
}

/// POST /artists/{id}/edit - city and state come from the submitted form
async fn edit_artist(
    State(state): State<Arc<FyyurState>>,
    RecordId(id): RecordId,
    FormBody(form): FormBody,
) -> Result<Response, PageError> {
    let target = format!("/artists/{id}");
    match save_artist(&state, id, &form).await {
        Ok(artist) => {
            tracing::info!(artist_id = artist.id, "artist updated");
            Ok(redirect_with_flash(
                &target,
                &format!("Artist {} was successfully updated!", artist.name),
            ))
        }
        Err(e) if e.is_not_found() => Err(PageError::NotFound),
        Err(e) => {
            tracing::warn!(artist_id = id, error = %e, "artist could not be updated");
            Ok(redirect_with_flash(
                &target,
                &format!(
                    "An error occurred. Artist {} could not be updated.",
                    form.text("name").trim()
                ),
            ))
        }
    }
}

/// Artist routes
pub fn router() -> Router<Arc<FyyurState>> {
    Router::new()
        .route("/artists", get(list_artists))
        .route("/artists/search", post(search_artists))
        .route("/artists/create", get(create_artist_form).post(create_artist))
        .route("/artists/{id}", get(show_artist))
        .route("/artists/{id}/edit", get(edit_artist_form).post(edit_artist))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::{Duration, Utc};

    use crate::db::repos::FyyurRepo;
    use crate::http::fyyur::router;
    use crate::http::fyyur::test_support::*;
    use crate::models::ShowDraft;

    #[tokio::test]
    async fn create_and_list_artists() {
        let repo = Arc::new(MemoryFyyurRepo::new());
        let app = router(repo.clone());

        let reply = send(&app, post_form("/artists/create", PETALS)).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(
            reply.flash.as_deref(),
            Some("Artist Guns N Petals was successfully listed!")
        );

        let reply = send(&app, get("/artists")).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("href=\"/artists/1\""));
        assert!(reply.body.contains("Guns N Petals"));
    }

    #[tokio::test]
    async fn invalid_artist_flashes_error() {
        let app = router(Arc::new(MemoryFyyurRepo::new()));
        let reply = send(
            &app,
            post_form("/artists/create", "name=Matt+Quevedo&city=New+York&state=ZZ"),
        )
        .await;
        assert_eq!(reply.location.as_deref(), Some("/"));
        assert_eq!(
            reply.flash.as_deref(),
            Some("An error occurred. Artist Matt Quevedo could not be listed.")
        );
    }

    #[tokio::test]
    async fn search_matches_substrings() {
        let repo = Arc::new(MemoryFyyurRepo::new());
        let app = router(repo.clone());
        send(&app, post_form("/artists/create", PETALS)).await;
        send(
            &app,
            post_form("/artists/create", "name=Matt+Quevedo&city=New+York&state=NY"),
        )
        .await;
        send(
            &app,
            post_form(
                "/artists/create",
                "name=The+Wild+Sax+Band&city=San+Francisco&state=CA",
            ),
        )
        .await;

        let reply = send(&app, post_form("/artists/search", "search_term=A")).await;
        assert!(reply.body.contains("\"A\": 3"));

        let reply = send(&app, post_form("/artists/search", "search_term=band")).await;
        assert!(reply.body.contains("\"band\": 1"));
        assert!(reply.body.contains("The Wild Sax Band"));
    }

    #[tokio::test]
    async fn artist_page_lists_venues_of_shows() {
        let repo = Arc::new(MemoryFyyurRepo::new());
        let app = router(repo.clone());
        send(&app, post_form("/venues/create", HOP)).await;
        send(&app, post_form("/artists/create", PETALS)).await;
        repo.create_show(&ShowDraft {
            venue_id: 1,
            artist_id: 1,
            start_time: Utc::now() - Duration::days(400),
        })
        .await
        .unwrap();

        let reply = send(&app, get("/artists/1")).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("0 Upcoming Shows"));
        assert!(reply.body.contains("1 Past Shows"));
        assert!(reply.body.contains("The Musical Hop"));
        assert!(reply.body.contains("Currently seeking performance venues"));
    }

    #[tokio::test]
    async fn edit_takes_city_and_state_from_form() {
        let repo = Arc::new(MemoryFyyurRepo::new());
        let app = router(repo.clone());
        send(&app, post_form("/artists/create", PETALS)).await;

        let reply = send(&app, get("/artists/1/edit")).await;
        assert!(reply.body.contains("value=\"326-123-5000\""));

        let reply = send(
            &app,
            post_form(
                "/artists/1/edit",
                "name=Guns+N+Petals&city=Seattle&state=WA&genres=Punk&genres=Soul",
            ),
        )
        .await;
        assert_eq!(reply.location.as_deref(), Some("/artists/1"));
        assert_eq!(
            reply.flash.as_deref(),
            Some("Artist Guns N Petals was successfully updated!")
        );

        let artist = repo.get_artist(1).await.unwrap();
        assert_eq!((artist.city.as_str(), artist.state.as_str()), ("Seattle", "WA"));
        assert_eq!(artist.genres, vec!["Punk", "Soul"]);
        assert!(!artist.seeking_venue);
    }

    #[tokio::test]
    async fn failed_edit_keeps_record() {
        let repo = Arc::new(MemoryFyyurRepo::new());
        let app = router(repo.clone());
        send(&app, post_form("/artists/create", PETALS)).await;

        let reply = send(&app, post_form("/artists/1/edit", "name=&city=Seattle&state=WA")).await;
        assert_eq!(reply.location.as_deref(), Some("/artists/1"));
        assert!(reply
            .flash
            .unwrap()
            .starts_with("An error occurred. Artist"));
        assert_eq!(repo.get_artist(1).await.unwrap().city, "San Francisco");
    }

    #[tokio::test]
    async fn missing_artist_is_404() {
        let app = router(Arc::new(MemoryFyyurRepo::new()));
        assert_eq!(send(&app, get("/artists/5")).await.status, StatusCode::NOT_FOUND);
        let reply = send(&app, post_form("/artists/5/edit", PETALS)).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }
}
