// src/models/suggestion.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// A proposed new question.
    Question,
    /// A free-text message to the admin.
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SuggestionStatus {
    New,
    Published,
}

/// Represents the 'suggestions' table.
///
/// Proposal fields are stored exactly as the visitor typed them; they are only
/// interpreted when an admin publishes the suggestion.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Suggestion {
    pub id: i64,
    pub user_id: Option<i64>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub subject_name: Option<String>,
    pub subject_id: Option<i64>,
    pub exam_type: Option<String>,
    pub question_text: Option<String>,
    pub choice_a: Option<String>,
    pub choice_b: Option<String>,
    pub choice_c: Option<String>,
    pub choice_d: Option<String>,
    pub proposed_correct_choice: Option<String>,
    pub proposed_explanation: Option<String>,
    pub image_path: Option<String>,
    pub message: Option<String>,
    pub status: SuggestionStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for the public "suggest a question" form.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SuggestQuestionRequest {
    pub subject_id: Option<String>,
    #[validate(length(max = 100, message = "Subject name is too long."))]
    pub subject_name: Option<String>,
    pub exam_type: Option<String>,
    #[validate(length(max = 5000, message = "Question text is too long."))]
    pub question_text: Option<String>,
    #[validate(length(max = 1000, message = "Choice A is too long."))]
    pub choice_a: Option<String>,
    #[validate(length(max = 1000, message = "Choice B is too long."))]
    pub choice_b: Option<String>,
    #[validate(length(max = 1000, message = "Choice C is too long."))]
    pub choice_c: Option<String>,
    #[validate(length(max = 1000, message = "Choice D is too long."))]
    pub choice_d: Option<String>,
    pub proposed_correct_choice: Option<String>,
    #[validate(length(max = 5000, message = "Explanation is too long."))]
    pub proposed_explanation: Option<String>,
}

impl SuggestQuestionRequest {
    /// Builds the request from multipart text fields.
    pub fn from_fields(mut fields: std::collections::HashMap<String, String>) -> Self {
        let mut take = |key: &str| fields.remove(key);
        Self {
            subject_id: take("subject_id"),
            subject_name: take("subject_name"),
            exam_type: take("exam_type"),
            question_text: take("question_text"),
            choice_a: take("choice_a"),
            choice_b: take("choice_b"),
            choice_c: take("choice_c"),
            choice_d: take("choice_d"),
            proposed_correct_choice: take("proposed_correct_choice"),
            proposed_explanation: take("proposed_explanation"),
        }
    }

    /// Subject picked from the list; a blank or non-numeric value means none.
    pub fn subject_id(&self) -> Option<i64> {
        self.subject_id
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
    }
}

/// DTO for the public contact message form.
#[derive(Debug, Deserialize, Validate)]
pub struct MessageRequest {
    #[validate(length(
        min = 1,
        max = 5000,
        message = "Message must be between 1 and 5000 characters."
    ))]
    pub message: String,
}

/// DTO for publishing a suggestion as a question.
#[derive(Debug, Deserialize)]
pub struct PublishSuggestionRequest {
    pub subject_id: Option<String>,
    pub exam_type: Option<String>,
}
