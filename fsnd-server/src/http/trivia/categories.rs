//! Category endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::{category_map, load_categories, CategoryMap, QuestionPage, TriviaState};
use crate::http::error::ApiError;
use crate::http::extractors::IdPath;
use crate::models::{PageParams, Pagination};

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: CategoryMap,
}

/// GET /categories - every category keyed by id
async fn list_categories(
    State(state): State<Arc<TriviaState>>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state.repo.list_categories().await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(CategoriesResponse {
        success: true,
        categories: category_map(categories),
    }))
}

/// GET /categories/{id}/questions - one page of a category's questions
async fn category_questions(
    State(state): State<Arc<TriviaState>>,
    IdPath(id): IdPath,
    Query(params): Query<PageParams>,
) -> Result<Json<QuestionPage>, ApiError> {
    let category = state.repo.get_category(id).await?;
    let page = state
        .repo
        .list_questions(Some(category.id), Pagination::from(params))
        .await?;
    let categories = load_categories(state.repo.as_ref()).await?;

    Ok(Json(QuestionPage::new(page, categories, Some(category.kind))?))
}

/// Category routes
pub fn router() -> Router<Arc<TriviaState>> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{id}/questions", get(category_questions))
}
