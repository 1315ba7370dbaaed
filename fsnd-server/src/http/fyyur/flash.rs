//! One-time flash messages carried in a cookie
//!
//! A mutation sets `_flash` on its redirect; the next rendered page shows
//! the message and expires the cookie.

use std::convert::Infallible;

use askama::Template;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};

use super::error::PageError;

pub const FLASH_COOKIE: &str = "_flash";

/// Flash message from the incoming request, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash(pub Option<String>);

impl Flash {
    /// The message, or "" when there is none
    pub fn text(&self) -> String {
        self.0.clone().unwrap_or_default()
    }

    fn from_cookie_header(header: &str) -> Option<String> {
        header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            if name != FLASH_COOKIE || value.is_empty() {
                return None;
            }
            urlencoding::decode(value).ok().map(|v| v.into_owned())
        })
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let message = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(Flash::from_cookie_header);
        Ok(Self(message))
    }
}

/// `Set-Cookie` value carrying `message`
pub fn flash_cookie(message: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        FLASH_COOKIE,
        urlencoding::encode(message)
    )
}

fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("_flash=; Path=/; Max-Age=0")
}

/// 303 redirect that leaves a flash message for the next page
pub fn redirect_with_flash(to: &str, message: &str) -> Response {
    (
        AppendHeaders([(SET_COOKIE, flash_cookie(message))]),
        Redirect::to(to),
    )
        .into_response()
}

/// Render a page, consuming the incoming flash message
pub fn render<T: Template>(page: &T, flash: &Flash) -> Result<Response, PageError> {
    let mut response = Html(page.render()?).into_response();
    if flash.0.is_some() {
        response.headers_mut().append(SET_COOKIE, clear_cookie());
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    async fn extract(cookie: Option<&str>) -> Flash {
        let mut builder = Request::builder().uri("/");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Flash::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn reads_encoded_message() {
        let cookie = flash_cookie("Venue The Hop & Co was successfully listed!");
        let value = cookie.split(';').next().unwrap();

        let flash = extract(Some(&format!("session=abc; {value}"))).await;
        assert_eq!(
            flash.text(),
            "Venue The Hop & Co was successfully listed!"
        );
    }

    #[tokio::test]
    async fn missing_or_cleared_cookie() {
        assert_eq!(extract(None).await, Flash(None));
        assert_eq!(extract(Some("_flash=")).await, Flash(None));
        assert_eq!(extract(Some("other=1")).await.text(), "");
    }

    #[test]
    fn redirect_sets_cookie() {
        let response = redirect_with_flash("/venues", "done");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/venues");
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("_flash=done;"));
    }
}
