//! Trivia JSON API
//!
//! Every error, including unknown routes and wrong methods, uses the
//! `ApiError` body. CORS is open to any origin.

mod categories;
mod questions;
mod quizzes;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::Router;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use crate::db::repos::{DbError, TriviaRepo};
use crate::models::{Category, Paginated, Question};

/// Shared trivia state
pub struct TriviaState {
    pub repo: Arc<dyn TriviaRepo>,
}

/// Category id (as a string key) to category type
pub type CategoryMap = BTreeMap<String, String>;

/// Paginated question listing shared by `/questions`, `/search` and
/// `/categories/{id}/questions`
#[derive(Debug, Serialize)]
pub struct QuestionPage {
    pub success: bool,
    pub questions: Vec<Question>,
    pub total_questions: i64,
    pub categories: CategoryMap,
    pub current_category: Option<String>,
}

impl QuestionPage {
    /// 404 when the requested page holds no questions
    fn new(
        page: Paginated<Question>,
        categories: CategoryMap,
        current_category: Option<String>,
    ) -> Result<Self, ApiError> {
        if page.is_empty() {
            return Err(ApiError::NotFound);
        }
        Ok(Self {
            success: true,
            questions: page.items,
            total_questions: page.total,
            categories,
            current_category,
        })
    }
}

fn category_map(categories: Vec<Category>) -> CategoryMap {
    categories
        .into_iter()
        .map(|c| (c.id.to_string(), c.kind))
        .collect()
}

async fn load_categories(repo: &dyn TriviaRepo) -> Result<CategoryMap, DbError> {
    Ok(category_map(repo.list_categories().await?))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build the trivia router over any repository
pub fn router(repo: Arc<dyn TriviaRepo>) -> Router {
    let state = Arc::new(TriviaState { repo });

    Router::new()
        .merge(categories::router())
        .merge(questions::router())
        .merge(quizzes::router())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::test_support::*;

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (app, _) = app_with_questions(0).await;
        let (status, body) = send(&app, get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not Found");
    }

    #[tokio::test]
    async fn wrong_method_is_json_405() {
        let (app, _) = app_with_questions(0).await;
        let (status, body) = send(&app, delete("/categories")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], 405);
        assert_eq!(body["message"], "Method not allowed.");
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin() {
        let (app, _) = app_with_questions(0).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/questions")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "DELETE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("DELETE"));
        assert!(methods.contains("PATCH"));
    }
}
