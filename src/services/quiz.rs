// src/services/quiz.rs
//
// Browsing questions, answering them and the points leaderboard.

use chrono::Utc;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    config::QUESTIONS_PER_PAGE,
    error::AppError,
    models::{
        attempt::Attempt,
        question::{Choice, ExamType, Question, Source},
        user::{AttemptStats, LeaderboardEntry},
    },
};

/// Which slice of a subject is being browsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub source: Source,
    /// `None` for AI questions, which are not split by exam.
    pub exam: Option<ExamType>,
}

impl Scope {
    /// Coerces raw query parameters.
    ///
    /// An unknown source becomes `past`. Past questions need a valid exam
    /// type; `None` means the caller should send the visitor back to the
    /// exam picker. AI questions ignore the exam parameter.
    pub fn from_params(source: Option<&str>, exam: Option<&str>) -> Option<Scope> {
        match Source::parse_or_default(source) {
            Source::Past => Some(Scope {
                source: Source::Past,
                exam: Some(ExamType::parse(exam?)?),
            }),
            Source::Ai => Some(Scope {
                source: Source::Ai,
                exam: None,
            }),
        }
    }

    pub fn exam_str(&self) -> &'static str {
        self.exam.map(ExamType::as_str).unwrap_or("")
    }
}

/// Listing filter within one subject.
#[derive(Debug, Clone)]
pub struct QuestionFilter {
    pub scope: Scope,
    /// Substring matched against the question text.
    pub search: Option<String>,
}

/// One page of a subject listing.
#[derive(Debug, Serialize)]
pub struct QuestionPage {
    pub questions: Vec<Question>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

/// Parses a `page` parameter; anything malformed or below 1 is page 1.
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, subject_id: i64, filter: &QuestionFilter) {
    builder.push(" FROM questions WHERE subject_id = ");
    builder.push_bind(subject_id);

    match filter.scope.exam {
        Some(ExamType::Both) | None => {}
        Some(exam) => {
            builder.push(" AND exam_type = ");
            builder.push_bind(exam.as_str());
        }
    }

    builder.push(" AND source = ");
    builder.push_bind(filter.scope.source.as_str());

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        builder.push(" AND question_text LIKE ");
        builder.push_bind(format!("%{}%", search));
    }
}

/// Lists a subject's questions, newest first, `QUESTIONS_PER_PAGE` at a time.
///
/// Ordering by id descending keeps earlier pages stable while questions are added.
pub async fn list_questions(
    pool: &SqlitePool,
    subject_id: i64,
    filter: &QuestionFilter,
    page: i64,
) -> Result<QuestionPage, AppError> {
    let page = page.max(1);

    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
    push_filter(&mut count_query, subject_id, filter);
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(pool)
        .await?;

    let mut list_query = QueryBuilder::<Sqlite>::new("SELECT *");
    push_filter(&mut list_query, subject_id, filter);
    list_query.push(" ORDER BY id DESC LIMIT ");
    list_query.push_bind(QUESTIONS_PER_PAGE);
    list_query.push(" OFFSET ");
    list_query.push_bind((page - 1) * QUESTIONS_PER_PAGE);

    let questions: Vec<Question> = list_query.build_query_as().fetch_all(pool).await?;

    let total_pages = ((total + QUESTIONS_PER_PAGE - 1) / QUESTIONS_PER_PAGE).max(1);

    Ok(QuestionPage {
        questions,
        total,
        page,
        total_pages,
    })
}

/// Previous and next question ids within the same subject, exam type and source.
pub async fn neighbours(
    pool: &SqlitePool,
    question: &Question,
) -> Result<(Option<i64>, Option<i64>), AppError> {
    let prev = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id FROM questions
        WHERE subject_id = $1 AND exam_type = $2 AND source = $3 AND id < $4
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(question.subject_id)
    .bind(question.exam_type)
    .bind(question.source)
    .bind(question.id)
    .fetch_optional(pool)
    .await?;

    let next = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id FROM questions
        WHERE subject_id = $1 AND exam_type = $2 AND source = $3 AND id > $4
        ORDER BY id ASC
        LIMIT 1
        "#,
    )
    .bind(question.subject_id)
    .bind(question.exam_type)
    .bind(question.source)
    .bind(question.id)
    .fetch_optional(pool)
    .await?;

    Ok((prev, next))
}

/// Appends an attempt and awards the point for a first correct answer.
///
/// Both writes share one transaction, and the award is conditional on no
/// earlier correct attempt existing, so a user earns at most one point per
/// question even under concurrent submissions. Returns whether a point was
/// awarded.
pub async fn record_attempt(
    pool: &SqlitePool,
    user_id: i64,
    question_id: i64,
    chosen: Choice,
    is_correct: bool,
) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    let attempt_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO attempts (user_id, question_id, chosen_choice, is_correct, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .bind(chosen)
    .bind(is_correct)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record attempt: {:?}", e);
        AppError::from(e)
    })?;

    let mut awarded = false;
    if is_correct {
        let result = sqlx::query(
            r#"
            UPDATE users SET points = points + 1
            WHERE id = $1
              AND NOT EXISTS (
                SELECT 1 FROM attempts
                WHERE user_id = $1 AND question_id = $2 AND is_correct = 1 AND id <> $3
              )
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .bind(attempt_id)
        .execute(&mut *tx)
        .await?;
        awarded = result.rows_affected() > 0;
    }

    tx.commit().await?;

    if awarded {
        tracing::info!("User {} earned a point on question {}", user_id, question_id);
    }

    Ok(awarded)
}

/// The user's most recent attempt on a question.
pub async fn latest_attempt(
    pool: &SqlitePool,
    user_id: i64,
    question_id: i64,
) -> Result<Option<Attempt>, AppError> {
    let attempt = sqlx::query_as::<_, Attempt>(
        r#"
        SELECT id, user_id, question_id, chosen_choice, is_correct, created_at
        FROM attempts
        WHERE user_id = $1 AND question_id = $2
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .fetch_optional(pool)
    .await?;

    Ok(attempt)
}

pub async fn attempt_stats(pool: &SqlitePool, user_id: i64) -> Result<AttemptStats, AppError> {
    let stats = sqlx::query_as::<_, AttemptStats>(
        r#"
        SELECT COUNT(*) AS total_attempts, COALESCE(SUM(is_correct), 0) AS total_correct
        FROM attempts
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// Top non-admin users by points; ties go to the earlier account.
pub async fn leaderboard(pool: &SqlitePool, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
    let entries = sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT id, username, full_name, points
        FROM users
        WHERE role != 'admin'
        ORDER BY points DESC, created_at ASC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// 1 + the number of non-admin users with strictly more points.
pub async fn rank_for_points(pool: &SqlitePool, points: i64) -> Result<i64, AppError> {
    let rank = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) + 1 FROM users WHERE role != 'admin' AND points > $1",
    )
    .bind(points)
    .fetch_one(pool)
    .await?;

    Ok(rank)
}
