// src/models/subject.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'subjects' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A subject with the number of questions filed under it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubjectSummary {
    pub id: i64,
    pub name: String,
    pub question_count: i64,
}

/// DTO for creating or renaming a subject.
#[derive(Debug, Deserialize, Validate)]
pub struct SubjectForm {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Subject name must be between 1 and 100 characters."
    ))]
    pub name: String,
}
