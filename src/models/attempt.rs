// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::question::Choice;

/// Represents the 'attempts' table: one row per answer submission.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub question_id: i64,
    pub chosen_choice: Choice,
    pub is_correct: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// What a submission produced. Anonymous submissions are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub chosen_choice: Choice,
    pub is_correct: bool,
}

/// Answer form posted from the question page.
#[derive(Debug, Deserialize)]
pub struct AnswerForm {
    pub choice: Option<String>,
}
