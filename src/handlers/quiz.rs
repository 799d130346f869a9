// src/handlers/quiz.rs

use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use minijinja::context;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    config::LEADERBOARD_SIZE,
    error::AppError,
    models::{
        attempt::{AnswerForm, AnswerOutcome},
        question::Choice,
    },
    services::{
        content,
        quiz::{self, QuestionFilter, Scope},
    },
    utils::session::RequestContext,
    views::Views,
};

/// Query string of the subject pages. Everything is optional and coerced.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    pub source: Option<String>,
    pub exam: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
}

impl BrowseQuery {
    fn scope(&self) -> Option<Scope> {
        Scope::from_params(self.source.as_deref(), self.exam.as_deref())
    }
}

/// Subjects to browse for a source and exam type.
pub async fn subjects_list(
    State(pool): State<SqlitePool>,
    State(views): State<Views>,
    ctx: RequestContext,
    Query(query): Query<BrowseQuery>,
) -> Result<Response, AppError> {
    let Some(scope) = query.scope() else {
        return Ok(ctx.redirect("/questions/past"));
    };

    let subjects = content::list_subjects(&pool).await?;

    ctx.render(
        &views,
        "subjects_list.html",
        context! {
            subjects => subjects,
            source => scope.source.as_str(),
            exam => scope.exam_str(),
        },
    )
}

/// One subject's questions, filtered, searched and paginated.
pub async fn subject_view(
    State(pool): State<SqlitePool>,
    State(views): State<Views>,
    ctx: RequestContext,
    Path(subject_id): Path<i64>,
    Query(query): Query<BrowseQuery>,
) -> Result<Response, AppError> {
    let Some(subject) = content::find_subject(&pool, subject_id).await? else {
        return Ok(ctx.redirect("/"));
    };

    let Some(scope) = query.scope() else {
        return Ok(ctx.redirect("/questions/past"));
    };

    let search = query.q.clone().unwrap_or_default();
    let filter = QuestionFilter {
        scope,
        search: Some(search.clone()),
    };
    let page = quiz::parse_page(query.page.as_deref());
    let listing = quiz::list_questions(&pool, subject.id, &filter, page).await?;

    ctx.render(
        &views,
        "subject.html",
        context! {
            subject => subject,
            questions => listing.questions,
            total => listing.total,
            page => listing.page,
            total_pages => listing.total_pages,
            source => scope.source.as_str(),
            exam => scope.exam_str(),
            q => search,
        },
    )
}

pub async fn question_view(
    State(pool): State<SqlitePool>,
    State(views): State<Views>,
    ctx: RequestContext,
    Path(question_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(q) = content::find_question_with_subject(&pool, question_id).await? else {
        return Ok(ctx.redirect("/"));
    };
    let (prev_id, next_id) = quiz::neighbours(&pool, &q.question).await?;

    ctx.render(
        &views,
        "question.html",
        context! { q => q, prev_id => prev_id, next_id => next_id },
    )
}

/// Grades a submitted answer.
///
/// Anonymous visitors see the result straight away and nothing is stored.
/// Signed-in users get the attempt recorded (and a point for a first correct
/// answer), then are redirected to the result page.
pub async fn answer(
    State(pool): State<SqlitePool>,
    State(views): State<Views>,
    ctx: RequestContext,
    Path(question_id): Path<i64>,
    Form(payload): Form<AnswerForm>,
) -> Result<Response, AppError> {
    let Some(q) = content::find_question_with_subject(&pool, question_id).await? else {
        return Ok(ctx.redirect("/"));
    };

    let Some(chosen) = payload.choice.as_deref().and_then(Choice::parse) else {
        return Ok(ctx.flash_redirect(
            &format!("/questions/{question_id}"),
            "Please pick one of the four answers.",
        ));
    };
    let is_correct = q.question.is_correct(chosen);

    let Some(user_id) = ctx.user_id() else {
        let (prev_id, next_id) = quiz::neighbours(&pool, &q.question).await?;
        let attempt = AnswerOutcome {
            chosen_choice: chosen,
            is_correct,
        };
        return ctx.render(
            &views,
            "question_result.html",
            context! { q => q, attempt => attempt, prev_id => prev_id, next_id => next_id },
        );
    };

    let awarded = quiz::record_attempt(&pool, user_id, question_id, chosen, is_correct).await?;
    let result_url = format!("/questions/{question_id}/result");

    if awarded {
        Ok(ctx.flash_redirect(&result_url, "Correct! You earned a point."))
    } else {
        Ok(ctx.redirect(&result_url))
    }
}

/// The question with the signed-in user's latest attempt on it.
pub async fn result(
    State(pool): State<SqlitePool>,
    State(views): State<Views>,
    ctx: RequestContext,
    Path(question_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(q) = content::find_question_with_subject(&pool, question_id).await? else {
        return Ok(ctx.redirect("/"));
    };
    let (prev_id, next_id) = quiz::neighbours(&pool, &q.question).await?;

    let attempt = match ctx.user_id() {
        Some(user_id) => quiz::latest_attempt(&pool, user_id, question_id).await?,
        None => None,
    };

    ctx.render(
        &views,
        "question_result.html",
        context! { q => q, attempt => attempt, prev_id => prev_id, next_id => next_id },
    )
}

/// Personal statistics, the leaderboard and the user's rank.
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    State(views): State<Views>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let Some(user) = ctx.user.clone() else {
        return Err(AppError::AuthError("Dashboard requires a session".to_string()));
    };

    let stats = quiz::attempt_stats(&pool, user.id).await?;
    let leaderboard = quiz::leaderboard(&pool, LEADERBOARD_SIZE).await?;
    let rank = quiz::rank_for_points(&pool, user.points).await?;

    ctx.render(
        &views,
        "dashboard.html",
        context! { stats => stats, leaderboard => leaderboard, rank => rank },
    )
}
