//! In-memory trivia storage; questions must reference an existing category

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::repos::{DbError, TriviaRepo};
use crate::models::trivia::DEFAULT_CATEGORIES;
use crate::models::{Category, NewQuestion, Paginated, Pagination, Question};

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    questions: BTreeMap<i32, Question>,
    last_question_id: i32,
}

/// In-memory trivia storage
#[derive(Default)]
pub struct MemoryTriviaRepo {
    tables: RwLock<Tables>,
}

impl MemoryTriviaRepo {
    /// Empty store with no categories
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the same categories `migrate` creates
    pub fn with_default_categories() -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .zip(1..)
            .map(|(kind, id)| Category {
                id,
                kind: (*kind).to_string(),
            })
            .collect();
        Self {
            tables: RwLock::new(Tables {
                categories,
                ..Tables::default()
            }),
        }
    }
}

#[async_trait]
impl TriviaRepo for MemoryTriviaRepo {
    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        Ok(self.tables.read().await.categories.clone())
    }

    async fn get_category(&self, id: i32) -> Result<Category, DbError> {
        self.tables
            .read()
            .await
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| DbError::not_found("category", id))
    }

    async fn list_questions(
        &self,
        category: Option<i32>,
        page: Pagination,
    ) -> Result<Paginated<Question>, DbError> {
        let tables = self.tables.read().await;
        let matching: Vec<Question> = tables
            .questions
            .values()
            .filter(|q| category.map_or(true, |id| q.category == id))
            .cloned()
            .collect();
        Ok(page.paginate(&matching))
    }

    async fn all_questions(&self) -> Result<Vec<Question>, DbError> {
        Ok(self.tables.read().await.questions.values().cloned().collect())
    }

    async fn quiz_candidates(
        &self,
        category: Option<i32>,
        exclude: &[i32],
    ) -> Result<Vec<Question>, DbError> {
        Ok(self
            .tables
            .read()
            .await
            .questions
            .values()
            .filter(|q| category.map_or(true, |id| q.category == id))
            .filter(|q| !exclude.contains(&q.id))
            .cloned()
            .collect())
    }

    async fn create_question(&self, question: &NewQuestion) -> Result<Question, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.categories.iter().any(|c| c.id == question.category) {
            return Err(DbError::not_found("category", question.category));
        }

        tables.last_question_id += 1;
        let created = Question {
            id: tables.last_question_id,
            question: question.question.clone(),
            answer: question.answer.clone(),
            category: question.category,
            difficulty: question.difficulty,
        };
        tables.questions.insert(created.id, created.clone());
        tracing::debug!(question_id = created.id, "created question");
        Ok(created)
    }

    async fn delete_question(&self, id: i32) -> Result<Question, DbError> {
        self.tables
            .write()
            .await
            .questions
            .remove(&id)
            .ok_or_else(|| DbError::not_found("question", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_question(text: &str, category: i32) -> NewQuestion {
        NewQuestion {
            question: text.into(),
            answer: "answer".into(),
            category,
            difficulty: 1,
        }
    }

    #[tokio::test]
    async fn default_categories_are_numbered_from_one() {
        let repo = MemoryTriviaRepo::with_default_categories();
        let categories = repo.list_categories().await.unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(categories[0].id, 1);
        assert_eq!(categories[0].kind, "Science");
        assert_eq!(repo.get_category(6).await.unwrap().kind, "Sports");
        assert!(repo.get_category(7).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn questions_page_in_id_order() {
        let repo = MemoryTriviaRepo::with_default_categories();
        for i in 0..12 {
            repo.create_question(&new_question(&format!("q{i}"), 1 + i % 2))
                .await
                .unwrap();
        }

        let second = repo.list_questions(None, Pagination::new(2, 10)).await.unwrap();
        assert_eq!(second.total, 12);
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[0].id, 11);

        let science = repo
            .list_questions(Some(1), Pagination::default())
            .await
            .unwrap();
        assert_eq!(science.total, 6);
        assert!(science.items.iter().all(|q| q.category == 1));
    }

    #[tokio::test]
    async fn quiz_candidates_skip_previous() {
        let repo = MemoryTriviaRepo::with_default_categories();
        let first = repo.create_question(&new_question("a", 2)).await.unwrap();
        let second = repo.create_question(&new_question("b", 2)).await.unwrap();
        repo.create_question(&new_question("c", 3)).await.unwrap();

        let left = repo.quiz_candidates(Some(2), &[first.id]).await.unwrap();
        assert_eq!(left, vec![second.clone()]);

        let all = repo.quiz_candidates(None, &[first.id, second.id]).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].question, "c");
    }

    #[tokio::test]
    async fn create_requires_known_category() {
        let repo = MemoryTriviaRepo::new();
        let err = repo.create_question(&new_question("a", 1)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_returns_removed_question() {
        let repo = MemoryTriviaRepo::with_default_categories();
        let created = repo.create_question(&new_question("a", 1)).await.unwrap();

        let deleted = repo.delete_question(created.id).await.unwrap();
        assert_eq!(deleted, created);
        assert!(repo.all_questions().await.unwrap().is_empty());
        assert!(repo.delete_question(created.id).await.unwrap_err().is_not_found());
    }
}
