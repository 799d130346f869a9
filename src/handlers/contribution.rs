// src/handlers/contribution.rs
//
// Public submissions: suggested questions, contact messages and error reports.

use axum::{
    Form,
    extract::{Multipart, Path, State},
    response::Response,
};
use minijinja::context;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        question::first_message,
        report::ReportRequest,
        suggestion::{MessageRequest, SuggestQuestionRequest},
    },
    services::{content, moderation},
    utils::{
        session::RequestContext,
        upload::{MultipartForm, save_upload_image},
    },
    views::Views,
};

pub async fn contact_page(
    State(pool): State<SqlitePool>,
    State(views): State<Views>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let subjects = content::list_subjects(&pool).await?;
    ctx.render(&views, "contact.html", context! { subjects => subjects })
}

/// Stores a proposed question, with an optional image, for admin review.
pub async fn suggest_question(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    ctx: RequestContext,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = MultipartForm::read(multipart).await?;
    let payload = SuggestQuestionRequest::from_fields(form.fields);

    if let Err(validation_errors) = payload.validate() {
        return Ok(ctx.flash_redirect("/contact", &first_message(&validation_errors)));
    }

    let image_path = save_upload_image(&config.upload_dir(), form.files.get("image")).await?;

    match moderation::submit_suggestion(&pool, ctx.user_id(), &payload, image_path.as_deref()).await
    {
        Ok(_) => Ok(ctx.flash_redirect("/contact", "Thank you! Your suggestion was sent.")),
        Err(AppError::BadRequest(msg)) => Ok(ctx.flash_redirect("/contact", &msg)),
        Err(e) => Err(e),
    }
}

pub async fn send_message(
    State(pool): State<SqlitePool>,
    ctx: RequestContext,
    Form(payload): Form<MessageRequest>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Ok(ctx.flash_redirect("/contact", &first_message(&validation_errors)));
    }

    moderation::submit_message(&pool, ctx.user_id(), &payload.message).await?;
    Ok(ctx.flash_redirect("/contact", "Thank you! Your message was sent."))
}

/// Flags a question's answer or explanation as wrong.
pub async fn report_question(
    State(pool): State<SqlitePool>,
    ctx: RequestContext,
    Path(question_id): Path<i64>,
    Form(payload): Form<ReportRequest>,
) -> Result<Response, AppError> {
    let back = format!("/questions/{question_id}");

    if let Err(validation_errors) = payload.validate() {
        return Ok(ctx.flash_redirect(&back, &first_message(&validation_errors)));
    }

    let filed = moderation::submit_report(
        &pool,
        ctx.user_id(),
        question_id,
        &payload.report_text,
        payload.proposed_correct_choice.as_deref(),
        payload.proposed_explanation.as_deref(),
    )
    .await?;

    match filed {
        Some(_) => Ok(ctx.flash_redirect(&back, "Thank you! The report was sent.")),
        None => Ok(ctx.redirect("/")),
    }
}
