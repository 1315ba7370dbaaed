//! Fyyur HTML site
//!
//! Mutations redirect with a flash message (post/redirect/get). Missing
//! records and unknown routes render the 404 page.

pub mod error;
pub mod flash;
pub mod pages;

mod artists;
mod shows;
mod venues;

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::db::repos::FyyurRepo;
pub use error::{PageError, SubmitError};
pub use flash::Flash;
use pages::HomePage;

/// Shared Fyyur state
pub struct FyyurState {
    pub repo: Arc<dyn FyyurRepo>,
}

/// Numeric record id from the path; anything else renders the 404 page
pub struct RecordId(pub i32);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| PageError::NotFound)?;

        let id = id.parse().map_err(|_| PageError::NotFound)?;
        Ok(Self(id))
    }
}

/// GET /
async fn home(flash: Flash) -> Result<Response, PageError> {
    flash::render(&HomePage { flash: flash.text() }, &flash)
}

async fn not_found() -> PageError {
    PageError::NotFound
}

/// Build the Fyyur router over any repository
pub fn router(repo: Arc<dyn FyyurRepo>) -> Router {
    let state = Arc::new(FyyurState { repo });

    Router::new()
        .route("/", get(home))
        .merge(venues::router())
        .merge(artists::router())
        .merge(shows::router())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::header::SET_COOKIE;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    pub use crate::db::MemoryFyyurRepo;

    /// Status, `Location`, decoded flash cookie and body of a response
    pub struct Reply {
        pub status: StatusCode,
        pub location: Option<String>,
        pub flash: Option<String>,
        pub body: String,
    }

    pub async fn send(app: &Router, request: Request<Body>) -> Reply {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get("location")
            .map(|v| v.to_str().unwrap().to_string());
        let flash = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.strip_prefix("_flash="))
            .filter_map(|v| v.split(';').next())
            .find(|v| !v.is_empty())
            .map(|v| urlencoding::decode(v).unwrap().into_owned());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        Reply {
            status,
            location,
            flash,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub const HOP: &str = "name=The+Musical+Hop&city=San+Francisco&state=CA\
        &address=1015+Folsom+Street&phone=123-123-1234&genres=Jazz&genres=Reggae\
        &seeking_talent=y&seeking_description=We+are+on+the+lookout";

    pub const PETALS: &str = "name=Guns+N+Petals&city=San+Francisco&state=CA\
        &phone=326-123-5000&genres=Rock+n+Roll&seeking_venue=y\
        &image_link=https%3A%2F%2Fimages.example%2Fgnp.png";
}
