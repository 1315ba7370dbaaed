//! Trivia repository on Postgres

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::{DbError, TriviaRepo};
use crate::models::{Category, NewQuestion, Paginated, Pagination, Question};

/// Trivia repository
#[derive(Clone)]
pub struct PgTriviaRepo {
    pool: PgPool,
}

impl PgTriviaRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TriviaRepo for PgTriviaRepo {
    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, type FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn get_category(&self, id: i32) -> Result<Category, DbError> {
        sqlx::query_as::<_, Category>("SELECT id, type FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("category", id))
    }

    /// Single query with COUNT(*) OVER() for the total.
    async fn list_questions(
        &self,
        category: Option<i32>,
        page: Pagination,
    ) -> Result<Paginated<Question>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id, question, answer, category, difficulty,
                COUNT(*) OVER() AS total
            FROM questions
            WHERE $1::int IS NULL OR category = $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category)
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let items = rows
            .into_iter()
            .map(|r| Question {
                id: r.get("id"),
                question: r.get("question"),
                answer: r.get("answer"),
                category: r.get("category"),
                difficulty: r.get("difficulty"),
            })
            .collect();

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn all_questions(&self) -> Result<Vec<Question>, DbError> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, question, answer, category, difficulty FROM questions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn quiz_candidates(
        &self,
        category: Option<i32>,
        exclude: &[i32],
    ) -> Result<Vec<Question>, DbError> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, question, answer, category, difficulty
            FROM questions
            WHERE ($1::int IS NULL OR category = $1)
              AND NOT (id = ANY($2))
            ORDER BY id
            "#,
        )
        .bind(category)
        .bind(exclude.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn create_question(&self, question: &NewQuestion) -> Result<Question, DbError> {
        let mut tx = self.pool.begin().await?;

        let (category_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(question.category)
                .fetch_one(&mut *tx)
                .await?;

        if !category_exists {
            return Err(DbError::not_found("category", question.category));
        }

        let created: Question = sqlx::query_as(
            r#"
            INSERT INTO questions (question, answer, category, difficulty)
            VALUES ($1, $2, $3, $4)
            RETURNING id, question, answer, category, difficulty
            "#,
        )
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(question_id = created.id, "created question");
        Ok(created)
    }

    async fn delete_question(&self, id: i32) -> Result<Question, DbError> {
        sqlx::query_as::<_, Question>(
            r#"
            DELETE FROM questions
            WHERE id = $1
            RETURNING id, question, answer, category, difficulty
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("question", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrations};

    // cargo test -p fsnd-server -- --ignored

    async fn repo() -> PgTriviaRepo {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run_trivia(&pool).await.expect("migrations failed");
        PgTriviaRepo::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_then_delete_question() {
        let repo = repo().await;
        let category = repo.list_categories().await.unwrap()[0].id;

        let created = repo
            .create_question(&NewQuestion {
                question: "who invented the light bulb".into(),
                answer: "Thomas Edison".into(),
                category,
                difficulty: 2,
            })
            .await
            .unwrap();

        let candidates = repo.quiz_candidates(Some(category), &[]).await.unwrap();
        assert!(candidates.iter().any(|q| q.id == created.id));

        let excluded = repo
            .quiz_candidates(Some(category), &[created.id])
            .await
            .unwrap();
        assert!(excluded.iter().all(|q| q.id != created.id));

        repo.delete_question(created.id).await.unwrap();
        assert!(repo
            .delete_question(created.id)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unknown_category_is_not_found() {
        let repo = repo().await;
        let err = repo
            .create_question(&NewQuestion {
                question: "q".into(),
                answer: "a".into(),
                category: i32::MAX,
                difficulty: 1,
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
