//! Custom Axum extractors

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::models::FormData;

/// JSON body whose rejections use the API error shape
///
/// Malformed JSON or a missing content type is a 400; a body that parses
/// but does not fit `T` is a 422.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Extract a numeric id from the path; anything else is a 404
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound)?;

        let id = id.parse().map_err(|_| ApiError::NotFound)?;
        Ok(Self(id))
    }
}

/// `application/x-www-form-urlencoded` body with repeated keys preserved
pub struct FormBody(pub FormData);

impl<S> FromRequest<S> for FormBody
where
    S: Send + Sync,
{
    type Rejection = BytesRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await?;
        Ok(Self(FormData::parse(&body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Body1 {
        n: i32,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn api_json_accepts_valid_body() {
        let ApiJson(body) = ApiJson::<Body1>::from_request(json_request(r#"{"n": 3}"#), &())
            .await
            .unwrap();
        assert_eq!(body.n, 3);
    }

    #[tokio::test]
    async fn api_json_syntax_error_is_400() {
        let err = ApiJson::<Body1>::from_request(json_request("{not json"), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn api_json_wrong_shape_is_422() {
        let err = ApiJson::<Body1>::from_request(json_request(r#"{"n": "three"}"#), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn form_body_keeps_repeated_keys() {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("genres=Jazz&genres=Folk&name=The+Hop"))
            .unwrap();

        let FormBody(form) = FormBody::from_request(request, &()).await.unwrap();
        assert_eq!(form.all("genres"), vec!["Jazz", "Folk"]);
        assert_eq!(form.text("name"), "The Hop");
    }
}
