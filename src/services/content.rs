// src/services/content.rs
//
// Subjects and questions: the admin-managed part of the bank.

use chrono::Utc;
use sqlx::{SqlitePool, sqlite::SqliteExecutor};

use crate::{
    error::AppError,
    models::{
        question::{NewQuestion, Question, QuestionUpdate, QuestionWithSubject},
        subject::{Subject, SubjectSummary},
    },
};

fn unique_name_conflict(e: sqlx::Error, name: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("A subject named '{}' already exists", name))
        }
        _ => {
            tracing::error!("Subject write failed: {:?}", e);
            AppError::from(e)
        }
    }
}

/// All subjects, alphabetical.
pub async fn list_subjects(pool: &SqlitePool) -> Result<Vec<Subject>, AppError> {
    let subjects =
        sqlx::query_as::<_, Subject>("SELECT id, name, created_at FROM subjects ORDER BY name")
            .fetch_all(pool)
            .await?;

    Ok(subjects)
}

/// All subjects with their question counts, alphabetical.
pub async fn subject_summaries(pool: &SqlitePool) -> Result<Vec<SubjectSummary>, AppError> {
    let summaries = sqlx::query_as::<_, SubjectSummary>(
        r#"
        SELECT s.id, s.name, COUNT(q.id) AS question_count
        FROM subjects s
        LEFT JOIN questions q ON q.subject_id = s.id
        GROUP BY s.id, s.name
        ORDER BY s.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(summaries)
}

pub async fn find_subject(pool: &SqlitePool, id: i64) -> Result<Option<Subject>, AppError> {
    let subject =
        sqlx::query_as::<_, Subject>("SELECT id, name, created_at FROM subjects WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(subject)
}

/// Creates a subject. A duplicate name is `AppError::Conflict`.
pub async fn create_subject(pool: &SqlitePool, name: &str) -> Result<Subject, AppError> {
    let name = name.trim();

    let subject = sqlx::query_as::<_, Subject>(
        r#"
        INSERT INTO subjects (name, created_at)
        VALUES ($1, $2)
        RETURNING id, name, created_at
        "#,
    )
    .bind(name)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| unique_name_conflict(e, name))?;

    Ok(subject)
}

/// Renames a subject. Returns `false` when it does not exist.
pub async fn rename_subject(pool: &SqlitePool, id: i64, name: &str) -> Result<bool, AppError> {
    let name = name.trim();

    let result = sqlx::query("UPDATE subjects SET name = $1 WHERE id = $2")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| unique_name_conflict(e, name))?;

    Ok(result.rows_affected() > 0)
}

/// Deletes a subject; its questions and their attempts and reports go with it.
pub async fn delete_subject(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete subject: {:?}", e);
            AppError::from(e)
        })?;

    Ok(result.rows_affected() > 0)
}

/// Looks a subject up by exact name, creating it when missing. Returns its id.
pub async fn subject_id_for_name<'e, E>(executor: E, name: &str) -> Result<i64, AppError>
where
    E: SqliteExecutor<'e>,
{
    // The no-op update makes RETURNING yield the existing row on conflict.
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO subjects (name, created_at)
        VALUES ($1, $2)
        ON CONFLICT(name) DO UPDATE SET name = excluded.name
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(id)
}

pub async fn find_question(pool: &SqlitePool, id: i64) -> Result<Option<Question>, AppError> {
    let question = sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(question)
}

pub async fn find_question_with_subject(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<QuestionWithSubject>, AppError> {
    let question = sqlx::query_as::<_, QuestionWithSubject>(
        r#"
        SELECT q.*, s.name AS subject_name
        FROM questions q
        JOIN subjects s ON s.id = q.subject_id
        WHERE q.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(question)
}

/// Most recently added questions with their subject names.
pub async fn recent_questions(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<QuestionWithSubject>, AppError> {
    let questions = sqlx::query_as::<_, QuestionWithSubject>(
        r#"
        SELECT q.*, s.name AS subject_name
        FROM questions q
        JOIN subjects s ON s.id = q.subject_id
        ORDER BY q.id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(questions)
}

pub async fn count_questions(pool: &SqlitePool) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await?)
}

/// Inserts a question and returns its id.
pub async fn create_question<'e, E>(executor: E, q: &NewQuestion) -> Result<i64, AppError>
where
    E: SqliteExecutor<'e>,
{
    let now = Utc::now();

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO questions
        (subject_id, exam_type, question_text, choice_a, choice_b, choice_c, choice_d,
         correct_choice, image_path, source, explanation, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
        RETURNING id
        "#,
    )
    .bind(q.subject_id)
    .bind(q.exam_type)
    .bind(&q.question_text)
    .bind(&q.choice_a)
    .bind(&q.choice_b)
    .bind(&q.choice_c)
    .bind(&q.choice_d)
    .bind(q.correct_choice)
    .bind(&q.image_path)
    .bind(q.source)
    .bind(&q.explanation)
    .bind(now)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::from(e)
    })?;

    Ok(id)
}

/// Updates a question. Without a new image the stored image path is kept.
pub async fn update_question(
    pool: &SqlitePool,
    id: i64,
    update: &QuestionUpdate,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE questions
        SET question_text = $1, choice_a = $2, choice_b = $3, choice_c = $4, choice_d = $5,
            correct_choice = $6, image_path = COALESCE($7, image_path), source = $8,
            explanation = $9, updated_at = $10
        WHERE id = $11
        "#,
    )
    .bind(&update.question_text)
    .bind(&update.choice_a)
    .bind(&update.choice_b)
    .bind(&update.choice_c)
    .bind(&update.choice_d)
    .bind(update.correct_choice)
    .bind(&update.image_path)
    .bind(update.source)
    .bind(&update.explanation)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::from(e)
    })?;

    Ok(result.rows_affected() > 0)
}

/// Deletes a question; its attempts and reports go with it.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::from(e)
        })?;

    Ok(result.rows_affected() > 0)
}
