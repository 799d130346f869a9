// src/handlers/pages.rs

use axum::{extract::State, http::StatusCode, response::Response};
use minijinja::context;

use crate::{error::AppError, utils::session::RequestContext, views::Views};

pub async fn home(State(views): State<Views>, ctx: RequestContext) -> Result<Response, AppError> {
    ctx.render(&views, "home.html", context! {})
}

/// Landing page of the question bank: past exams or generated questions.
pub async fn questions_home(
    State(views): State<Views>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    ctx.render(&views, "questions_home.html", context! {})
}

/// Exam-type picker for past questions.
pub async fn questions_past(
    State(views): State<Views>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    ctx.render(&views, "questions_past.html", context! {})
}

pub async fn not_found_page(
    State(views): State<Views>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    ctx.render(&views, "404.html", context! {})
}

/// Router fallback: the not-found page with a 404 status.
pub async fn fallback(
    State(views): State<Views>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let mut response = ctx.render(&views, "404.html", context! {})?;
    *response.status_mut() = StatusCode::NOT_FOUND;
    Ok(response)
}
