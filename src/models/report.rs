// src/models/report.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ReportStatus {
    New,
    Resolved,
}

/// Represents the 'reports' table joined with the reported question's text.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: i64,
    pub user_id: Option<i64>,
    pub question_id: i64,
    pub report_text: String,
    pub proposed_correct_choice: Option<String>,
    pub proposed_explanation: Option<String>,
    pub status: ReportStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub question_text: String,
}

/// DTO for reporting a question.
#[derive(Debug, Deserialize, Validate)]
pub struct ReportRequest {
    #[validate(length(
        min = 1,
        max = 5000,
        message = "Please describe the problem (up to 5000 characters)."
    ))]
    pub report_text: String,
    pub proposed_correct_choice: Option<String>,
    #[validate(length(max = 5000, message = "Explanation is too long."))]
    pub proposed_explanation: Option<String>,
}

/// DTO for resolving a report by correcting the question.
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveReportRequest {
    pub correct_choice: Option<String>,
    #[validate(length(max = 5000, message = "Explanation is too long."))]
    pub explanation: Option<String>,
}
