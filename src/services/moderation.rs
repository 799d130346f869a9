// src/services/moderation.rs
//
// Visitor submissions (suggested questions, messages, error reports) and the
// admin actions that act on them.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        question::{Choice, ExamType, NewQuestion, Source},
        report::Report,
        suggestion::{SuggestQuestionRequest, Suggestion, SuggestionStatus},
    },
    services::content,
};

/// What happened to a publish request.
#[derive(Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The new question's id.
    Published(i64),
    SuggestionNotFound,
    AlreadyPublished,
    SubjectNotFound,
}

/// What happened to a resolve request.
#[derive(Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved,
    ReportNotFound,
}

/// Blank form fields are stored as NULL.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn submit_suggestion(
    pool: &SqlitePool,
    user_id: Option<i64>,
    req: &SuggestQuestionRequest,
    image_path: Option<&str>,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO suggestions (
            user_id, type, subject_name, subject_id, exam_type, question_text,
            choice_a, choice_b, choice_c, choice_d,
            proposed_correct_choice, proposed_explanation, image_path, status, created_at
        )
        VALUES ($1, 'question', $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'new', $13)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(non_blank(req.subject_name.as_deref()))
    .bind(req.subject_id())
    .bind(non_blank(req.exam_type.as_deref()))
    .bind(non_blank(req.question_text.as_deref()))
    .bind(non_blank(req.choice_a.as_deref()))
    .bind(non_blank(req.choice_b.as_deref()))
    .bind(non_blank(req.choice_c.as_deref()))
    .bind(non_blank(req.choice_d.as_deref()))
    .bind(non_blank(req.proposed_correct_choice.as_deref()))
    .bind(non_blank(req.proposed_explanation.as_deref()))
    .bind(image_path)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        // A subject picked from a stale form may have been deleted since.
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::BadRequest("The selected subject no longer exists.".to_string())
        }
        _ => {
            tracing::error!("Failed to store suggestion: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!("Suggestion {} submitted", id);
    Ok(id)
}

pub async fn submit_message(
    pool: &SqlitePool,
    user_id: Option<i64>,
    message: &str,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO suggestions (user_id, type, message, status, created_at)
        VALUES ($1, 'message', $2, 'new', $3)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(message)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::info!("Message {} submitted", id);
    Ok(id)
}

/// Files a report against a question. Returns `None` when the question is gone.
pub async fn submit_report(
    pool: &SqlitePool,
    user_id: Option<i64>,
    question_id: i64,
    report_text: &str,
    proposed_correct_choice: Option<&str>,
    proposed_explanation: Option<&str>,
) -> Result<Option<i64>, AppError> {
    if content::find_question(pool, question_id).await?.is_none() {
        return Ok(None);
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO reports (
            user_id, question_id, report_text, proposed_correct_choice,
            proposed_explanation, status, created_at
        )
        VALUES ($1, $2, $3, $4, $5, 'new', $6)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .bind(report_text)
    .bind(non_blank(proposed_correct_choice))
    .bind(non_blank(proposed_explanation))
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::info!("Report {} filed against question {}", id, question_id);
    Ok(Some(id))
}

/// All suggestions and messages, newest first.
pub async fn list_suggestions(pool: &SqlitePool) -> Result<Vec<Suggestion>, AppError> {
    let suggestions = sqlx::query_as::<_, Suggestion>(
        "SELECT * FROM suggestions ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(suggestions)
}

/// All reports with the reported question's text, newest first.
pub async fn list_reports(pool: &SqlitePool) -> Result<Vec<Report>, AppError> {
    let reports = sqlx::query_as::<_, Report>(
        r#"
        SELECT r.id, r.user_id, r.question_id, r.report_text, r.proposed_correct_choice,
               r.proposed_explanation, r.status, r.created_at, q.question_text
        FROM reports r
        JOIN questions q ON q.id = r.question_id
        ORDER BY r.created_at DESC, r.id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(reports)
}

pub async fn count_new_suggestions(pool: &SqlitePool) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suggestions WHERE status = 'new'")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_new_reports(pool: &SqlitePool) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports WHERE status = 'new'")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Turns a suggestion into a real question under the chosen subject and exam.
///
/// Missing text fields become empty strings and an unusable proposed answer
/// becomes `A`. The question is always filed as a past-exam question.
pub async fn publish_suggestion(
    pool: &SqlitePool,
    suggestion_id: i64,
    subject_id: i64,
    exam_type: ExamType,
) -> Result<PublishOutcome, AppError> {
    let mut tx = pool.begin().await?;

    let Some(suggestion) =
        sqlx::query_as::<_, Suggestion>("SELECT * FROM suggestions WHERE id = $1")
            .bind(suggestion_id)
            .fetch_optional(&mut *tx)
            .await?
    else {
        return Ok(PublishOutcome::SuggestionNotFound);
    };

    if suggestion.status != SuggestionStatus::New {
        return Ok(PublishOutcome::AlreadyPublished);
    }

    let subject_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subjects WHERE id = $1")
            .bind(subject_id)
            .fetch_one(&mut *tx)
            .await?
            > 0;
    if !subject_exists {
        return Ok(PublishOutcome::SubjectNotFound);
    }

    let question = NewQuestion {
        subject_id,
        exam_type,
        question_text: suggestion.question_text.unwrap_or_default(),
        choice_a: suggestion.choice_a.unwrap_or_default(),
        choice_b: suggestion.choice_b.unwrap_or_default(),
        choice_c: suggestion.choice_c.unwrap_or_default(),
        choice_d: suggestion.choice_d.unwrap_or_default(),
        correct_choice: suggestion
            .proposed_correct_choice
            .as_deref()
            .and_then(Choice::parse)
            .unwrap_or(Choice::A),
        image_path: suggestion.image_path,
        source: Source::Past,
        explanation: suggestion.proposed_explanation,
    };
    let question_id = content::create_question(&mut *tx, &question).await?;

    sqlx::query("UPDATE suggestions SET status = 'published' WHERE id = $1")
        .bind(suggestion_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        "Suggestion {} published as question {}",
        suggestion_id,
        question_id
    );
    Ok(PublishOutcome::Published(question_id))
}

/// Hard-deletes a suggestion. Returns `false` when it did not exist.
pub async fn reject_suggestion(pool: &SqlitePool, suggestion_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM suggestions WHERE id = $1")
        .bind(suggestion_id)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        tracing::info!("Suggestion {} rejected", suggestion_id);
    }
    Ok(result.rows_affected() > 0)
}

/// Corrects the reported question and marks the report resolved.
pub async fn resolve_report(
    pool: &SqlitePool,
    report_id: i64,
    correct_choice: Choice,
    explanation: Option<&str>,
) -> Result<ResolveOutcome, AppError> {
    let mut tx = pool.begin().await?;

    let Some(question_id) =
        sqlx::query_scalar::<_, i64>("SELECT question_id FROM reports WHERE id = $1")
            .bind(report_id)
            .fetch_optional(&mut *tx)
            .await?
    else {
        return Ok(ResolveOutcome::ReportNotFound);
    };

    sqlx::query(
        r#"
        UPDATE questions
        SET correct_choice = $1, explanation = $2, updated_at = $3
        WHERE id = $4
        "#,
    )
    .bind(correct_choice)
    .bind(non_blank(explanation))
    .bind(Utc::now())
    .bind(question_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE reports SET status = 'resolved' WHERE id = $1")
        .bind(report_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Report {} resolved; question {} corrected", report_id, question_id);
    Ok(ResolveOutcome::Resolved)
}
