//! Question endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{load_categories, QuestionPage, TriviaState};
use crate::db::repos::DbError;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, IdPath};
use crate::models::trivia::question_matches;
use crate::models::{LooseInt, NewQuestion, PageParams, Pagination, Question};

const ALL_CATEGORIES_LABEL: &str = "All Categories";

/// Create question request
///
/// Fields are optional so that missing ones become a 422 from validation
/// rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<LooseInt>,
    pub difficulty: Option<LooseInt>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub search_term: Option<String>,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub created: i32,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub deleted: i32,
    pub message: &'static str,
}

/// GET /questions - paginated questions across all categories
async fn list_questions(
    State(state): State<Arc<TriviaState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<QuestionPage>, ApiError> {
    let page = state
        .repo
        .list_questions(None, Pagination::from(params))
        .await?;
    let categories = load_categories(state.repo.as_ref()).await?;

    Ok(Json(QuestionPage::new(
        page,
        categories,
        Some(ALL_CATEGORIES_LABEL.to_string()),
    )?))
}

/// POST /questions - add a question
async fn create_question(
    State(state): State<Arc<TriviaState>>,
    ApiJson(req): ApiJson<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let new_question = NewQuestion::new(
        req.question.as_deref(),
        req.answer.as_deref(),
        req.category.as_ref(),
        req.difficulty.as_ref(),
    )?;

    let created = state
        .repo
        .create_question(&new_question)
        .await
        .map_err(|e| match e {
            DbError::NotFound { id, .. } => {
                ApiError::unprocessable(format!("category {id} does not exist"))
            }
            other => other.into(),
        })?;

    tracing::info!(question_id = created.id, "question added");
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            created: created.id,
            message: "Question Added",
        }),
    ))
}

/// DELETE /questions/{id}
async fn delete_question(
    State(state): State<Arc<TriviaState>>,
    IdPath(id): IdPath,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted = state.repo.delete_question(id).await?;

    tracing::info!(question_id = deleted.id, "question deleted");
    Ok(Json(DeletedResponse {
        success: true,
        deleted: deleted.id,
        message: "Question has been deleted",
    }))
}

/// POST /search - case-insensitive substring search over question text
async fn search_questions(
    State(state): State<Arc<TriviaState>>,
    Query(params): Query<PageParams>,
    ApiJson(req): ApiJson<SearchRequest>,
) -> Result<Json<QuestionPage>, ApiError> {
    let term = req
        .search_term
        .ok_or_else(|| ApiError::bad_request("search_term is required"))?;

    let found: Vec<Question> = state
        .repo
        .all_questions()
        .await?
        .into_iter()
        .filter(|q| question_matches(q, &term))
        .collect();
    let page = Pagination::from(params).paginate(&found);
    let categories = load_categories(state.repo.as_ref()).await?;

    Ok(Json(QuestionPage::new(page, categories, None)?))
}

/// Question routes
pub fn router() -> Router<Arc<TriviaState>> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/search", post(search_questions))
}
