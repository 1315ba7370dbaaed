//! Quiz endpoint

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::TriviaState;
use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::models::trivia::ALL_CATEGORIES;
use crate::models::{LooseInt, Question};

/// `quiz_category` body field; the client also sends `type`, which is
/// not needed to pick a question
#[derive(Debug, Deserialize)]
pub struct QuizCategory {
    pub id: LooseInt,
}

#[derive(Debug, Deserialize)]
pub struct QuizRequest {
    #[serde(default)]
    pub previous_questions: Vec<i32>,
    pub quiz_category: Option<QuizCategory>,
}

#[derive(Serialize)]
pub struct QuizResponse {
    pub success: bool,
    /// `None` once every question in the category has been played
    pub question: Option<Question>,
}

/// POST /quizzes - a random question not yet played
async fn next_question(
    State(state): State<Arc<TriviaState>>,
    ApiJson(req): ApiJson<QuizRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    let category_id = match &req.quiz_category {
        Some(category) => category.id.parse("quiz_category.id")?,
        None => i64::from(ALL_CATEGORIES),
    };

    let category = if category_id == i64::from(ALL_CATEGORIES) {
        None
    } else {
        let id = i32::try_from(category_id).map_err(|_| ApiError::NotFound)?;
        Some(state.repo.get_category(id).await?.id)
    };

    let candidates = state
        .repo
        .quiz_candidates(category, &req.previous_questions)
        .await?;
    let question = candidates.choose(&mut rand::thread_rng()).cloned();

    tracing::debug!(
        category = ?category,
        played = req.previous_questions.len(),
        remaining = candidates.len(),
        "quiz question picked"
    );
    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

/// Quiz routes
pub fn router() -> Router<Arc<TriviaState>> {
    Router::new().route("/quizzes", post(next_question))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::http::trivia::test_support::*;

    #[tokio::test]
    async fn picks_from_requested_category() {
        let (app, _) = app_with_questions(6).await;
        let (status, body) = send(
            &app,
            post_json(
                "/quizzes",
                json!({
                    "previous_questions": [1],
                    "quiz_category": {"id": 1, "type": "Science"}
                }),
            ),
        )
        .await;

        // category 1 holds questions 1, 3 and 5
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let id = body["question"]["id"].as_i64().unwrap();
        assert!(id == 3 || id == 5, "unexpected question {id}");
        assert_eq!(body["question"]["category"], 1);
    }

    #[tokio::test]
    async fn id_zero_means_all_categories() {
        let (app, _) = app_with_questions(4).await;
        let (status, body) = send(
            &app,
            post_json(
                "/quizzes",
                json!({
                    "previous_questions": [1, 2, 3],
                    "quiz_category": {"id": "0", "type": "click"}
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question"]["id"], 4);
    }

    #[tokio::test]
    async fn exhausted_quiz_returns_null_question() {
        let (app, _) = app_with_questions(2).await;
        let (status, body) = send(
            &app,
            post_json(
                "/quizzes",
                json!({"previous_questions": [1, 2], "quiz_category": {"id": 0}}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["question"].is_null());
    }

    #[tokio::test]
    async fn unknown_category_is_404() {
        let (app, _) = app_with_questions(2).await;
        let (status, _) = send(
            &app,
            post_json("/quizzes", json!({"previous_questions": [], "quiz_category": {"id": 77}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_numeric_category_is_422() {
        let (app, _) = app_with_questions(2).await;
        let (status, body) = send(
            &app,
            post_json("/quizzes", json!({"quiz_category": {"id": "science"}})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], 422);
    }
}
