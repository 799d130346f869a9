// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Which exam a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ExamType {
    Mid,
    Final,
    Both,
}

impl ExamType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mid" => Some(Self::Mid),
            "final" => Some(Self::Final),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mid => "mid",
            Self::Final => "final",
            Self::Both => "both",
        }
    }
}

/// Provenance of a question: a past exam paper or a generated set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Source {
    Past,
    Ai,
}

impl Source {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "past" => Some(Self::Past),
            "ai" => Some(Self::Ai),
            _ => None,
        }
    }

    /// Unrecognized or missing sources fall back to `past`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or(Self::Past)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Ai => "ai",
        }
    }
}

/// One of the four answer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    pub const ALL: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: i64,
    pub subject_id: i64,
    pub exam_type: ExamType,
    pub question_text: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
    pub correct_choice: Choice,

    /// Path relative to the static root, e.g. `uploads/<name>.png`.
    pub image_path: Option<String>,

    pub source: Source,
    pub explanation: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Question {
    /// An answer is correct iff it names the stored correct slot.
    pub fn is_correct(&self, chosen: Choice) -> bool {
        self.correct_choice == chosen
    }
}

/// A question joined with its subject's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestionWithSubject {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub question: Question,
    pub subject_name: String,
}

/// Field values for inserting a question.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub subject_id: i64,
    pub exam_type: ExamType,
    pub question_text: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
    pub correct_choice: Choice,
    pub image_path: Option<String>,
    pub source: Source,
    pub explanation: Option<String>,
}

/// Field values for editing a question. A `None` image keeps the stored one.
#[derive(Debug, Clone)]
pub struct QuestionUpdate {
    pub question_text: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
    pub correct_choice: Choice,
    pub image_path: Option<String>,
    pub source: Source,
    pub explanation: Option<String>,
}

/// Text fields of the admin question form, validated before parsing the enums.
#[derive(Debug, Validate)]
pub struct QuestionForm {
    pub subject_id: Option<String>,
    pub exam_type: Option<String>,
    pub source: Option<String>,
    #[validate(length(max = 5000, message = "Question text is too long."))]
    pub question_text: String,
    #[validate(length(min = 1, max = 1000, message = "Choice A is required."))]
    pub choice_a: String,
    #[validate(length(min = 1, max = 1000, message = "Choice B is required."))]
    pub choice_b: String,
    #[validate(length(min = 1, max = 1000, message = "Choice C is required."))]
    pub choice_c: String,
    #[validate(length(min = 1, max = 1000, message = "Choice D is required."))]
    pub choice_d: String,
    pub correct_choice: Option<String>,
    #[validate(length(max = 5000, message = "Explanation is too long."))]
    pub explanation: Option<String>,
}

impl QuestionForm {
    /// Builds a form from multipart text fields; absent fields stay empty.
    pub fn from_fields(mut fields: std::collections::HashMap<String, String>) -> Self {
        let mut take = |key: &str| fields.remove(key).unwrap_or_default();
        let question_text = take("question_text");
        let choice_a = take("choice_a");
        let choice_b = take("choice_b");
        let choice_c = take("choice_c");
        let choice_d = take("choice_d");
        let explanation = Some(take("explanation")).filter(|e| !e.trim().is_empty());

        Self {
            subject_id: fields.remove("subject_id"),
            exam_type: fields.remove("exam_type"),
            source: fields.remove("source"),
            question_text,
            choice_a,
            choice_b,
            choice_c,
            choice_d,
            correct_choice: fields.remove("correct_choice"),
            explanation,
        }
    }

    /// Validates the form and resolves it into an insert.
    pub fn into_new_question(self, image_path: Option<String>) -> Result<NewQuestion, String> {
        self.validate().map_err(|e| first_message(&e))?;

        let subject_id = self
            .subject_id
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .ok_or_else(|| "Please choose a subject.".to_string())?;
        let exam_type = self
            .exam_type
            .as_deref()
            .and_then(ExamType::parse)
            .ok_or_else(|| "Please choose an exam type.".to_string())?;
        let correct_choice = self
            .correct_choice
            .as_deref()
            .and_then(Choice::parse)
            .ok_or_else(|| "The correct choice must be A, B, C or D.".to_string())?;

        Ok(NewQuestion {
            subject_id,
            exam_type,
            question_text: self.question_text,
            choice_a: self.choice_a,
            choice_b: self.choice_b,
            choice_c: self.choice_c,
            choice_d: self.choice_d,
            correct_choice,
            image_path,
            source: Source::parse_or_default(self.source.as_deref()),
            explanation: self.explanation,
        })
    }

    /// Validates the form and resolves it into an edit.
    pub fn into_update(self, image_path: Option<String>) -> Result<QuestionUpdate, String> {
        self.validate().map_err(|e| first_message(&e))?;

        let correct_choice = self
            .correct_choice
            .as_deref()
            .and_then(Choice::parse)
            .ok_or_else(|| "The correct choice must be A, B, C or D.".to_string())?;

        Ok(QuestionUpdate {
            question_text: self.question_text,
            choice_a: self.choice_a,
            choice_b: self.choice_b,
            choice_c: self.choice_c,
            choice_d: self.choice_d,
            correct_choice,
            image_path,
            source: Source::parse_or_default(self.source.as_deref()),
            explanation: self.explanation,
        })
    }
}

/// Picks a user-facing message out of a validation failure.
pub fn first_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid form input.".to_string())
}
