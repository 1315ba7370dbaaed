//! Trivia records: categories and questions

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::required;
use super::ValidationError;

/// Categories created by `migrate` on an empty database
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

/// Quiz category id meaning "every category"
pub const ALL_CATEGORIES: i32 = 0;

const MAX_TEXT_LEN: usize = 1000;
const MIN_DIFFICULTY: i64 = 1;
const MAX_DIFFICULTY: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i32,
    pub question: String,
    pub answer: String,
    pub category: i32,
    pub difficulty: i32,
}

/// Integer that clients send either as a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LooseInt {
    Number(i64),
    Text(String),
}

impl LooseInt {
    pub fn parse(&self, field: &'static str) -> Result<i64, ValidationError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s.trim().parse().map_err(|_| ValidationError::InvalidFormat {
                field,
                reason: "must be an integer",
            }),
        }
    }
}

/// Validated question ready for insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i32,
    pub difficulty: i32,
}

impl NewQuestion {
    pub fn new(
        question: Option<&str>,
        answer: Option<&str>,
        category: Option<&LooseInt>,
        difficulty: Option<&LooseInt>,
    ) -> Result<Self, ValidationError> {
        let question = required("question", question.unwrap_or(""), MAX_TEXT_LEN)?;
        let answer = required("answer", answer.unwrap_or(""), MAX_TEXT_LEN)?;

        let category = category
            .ok_or(ValidationError::Empty { field: "category" })?
            .parse("category")?;
        let category = i32::try_from(category)
            .ok()
            .filter(|id| *id > 0)
            .ok_or(ValidationError::OutOfRange {
                field: "category",
                min: 1,
                max: i64::from(i32::MAX),
            })?;

        let difficulty = difficulty
            .ok_or(ValidationError::Empty { field: "difficulty" })?
            .parse("difficulty")?;
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
            return Err(ValidationError::OutOfRange {
                field: "difficulty",
                min: MIN_DIFFICULTY,
                max: MAX_DIFFICULTY,
            });
        }

        Ok(Self {
            question,
            answer,
            category,
            difficulty: difficulty as i32,
        })
    }
}

/// Case-insensitive substring match over question text
pub fn question_matches(question: &Question, term: &str) -> bool {
    question
        .question
        .to_lowercase()
        .contains(&term.to_lowercase())
}
