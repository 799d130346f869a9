// src/handlers/admin.rs
//
// Every handler here takes an `AdminSession`, so none runs for anonymous
// visitors or non-admin users.

use axum::{
    Form,
    extract::{Multipart, Path, State},
    response::Response,
};
use minijinja::context;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::{ADMIN_RECENT_QUESTIONS, Config},
    error::AppError,
    models::{
        question::{Choice, ExamType, QuestionForm, first_message},
        report::ResolveReportRequest,
        subject::SubjectForm,
        suggestion::PublishSuggestionRequest,
    },
    services::{
        content,
        moderation::{self, PublishOutcome, ResolveOutcome},
    },
    utils::{
        session::AdminSession,
        upload::{MultipartForm, save_upload_image},
    },
    views::Views,
};

/// Admin overview: subjects, totals, the moderation queues and recent questions.
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    State(views): State<Views>,
    AdminSession { ctx, .. }: AdminSession,
) -> Result<Response, AppError> {
    let subjects = content::subject_summaries(&pool).await?;
    let total_questions = content::count_questions(&pool).await?;
    let new_suggestions = moderation::count_new_suggestions(&pool).await?;
    let new_reports = moderation::count_new_reports(&pool).await?;
    let suggestions = moderation::list_suggestions(&pool).await?;
    let reports = moderation::list_reports(&pool).await?;
    let questions = content::recent_questions(&pool, ADMIN_RECENT_QUESTIONS).await?;

    ctx.render(
        &views,
        "admin.html",
        context! {
            total_subjects => subjects.len(),
            subjects => subjects,
            total_questions => total_questions,
            new_suggestions => new_suggestions,
            new_reports => new_reports,
            suggestions => suggestions,
            reports => reports,
            questions => questions,
            choices => Choice::ALL.map(Choice::as_str),
        },
    )
}

fn trimmed(form: SubjectForm) -> SubjectForm {
    SubjectForm {
        name: form.name.trim().to_string(),
    }
}

pub async fn create_subject(
    State(pool): State<SqlitePool>,
    AdminSession { ctx, .. }: AdminSession,
    Form(payload): Form<SubjectForm>,
) -> Result<Response, AppError> {
    let payload = trimmed(payload);
    if let Err(validation_errors) = payload.validate() {
        return Ok(ctx.flash_redirect("/admin", &first_message(&validation_errors)));
    }

    match content::create_subject(&pool, &payload.name).await {
        Ok(subject) => {
            tracing::info!("Subject {} created: {}", subject.id, subject.name);
            Ok(ctx.flash_redirect("/admin", "Subject created."))
        }
        Err(AppError::Conflict(_)) => Ok(ctx.flash_redirect(
            "/admin",
            "A subject with that name already exists.",
        )),
        Err(e) => Err(e),
    }
}

pub async fn rename_subject(
    State(pool): State<SqlitePool>,
    AdminSession { ctx, .. }: AdminSession,
    Path(subject_id): Path<i64>,
    Form(payload): Form<SubjectForm>,
) -> Result<Response, AppError> {
    let payload = trimmed(payload);
    if let Err(validation_errors) = payload.validate() {
        return Ok(ctx.flash_redirect("/admin", &first_message(&validation_errors)));
    }

    match content::rename_subject(&pool, subject_id, &payload.name).await {
        Ok(true) => Ok(ctx.flash_redirect("/admin", "Subject renamed.")),
        Ok(false) => Ok(ctx.flash_redirect("/admin", "Subject not found.")),
        Err(AppError::Conflict(_)) => Ok(ctx.flash_redirect(
            "/admin",
            "A subject with that name already exists.",
        )),
        Err(e) => Err(e),
    }
}

/// Deletes a subject together with its questions.
pub async fn delete_subject(
    State(pool): State<SqlitePool>,
    AdminSession { ctx, .. }: AdminSession,
    Path(subject_id): Path<i64>,
) -> Result<Response, AppError> {
    if content::delete_subject(&pool, subject_id).await? {
        tracing::info!("Subject {} deleted", subject_id);
        Ok(ctx.flash_redirect("/admin", "Subject deleted."))
    } else {
        Ok(ctx.flash_redirect("/admin", "Subject not found."))
    }
}

/// Creates a question from the multipart admin form, with an optional image.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    AdminSession { ctx, .. }: AdminSession,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = MultipartForm::read(multipart).await?;

    let mut question = match QuestionForm::from_fields(form.fields).into_new_question(None) {
        Ok(question) => question,
        Err(msg) => return Ok(ctx.flash_redirect("/admin", &msg)),
    };

    if content::find_subject(&pool, question.subject_id).await?.is_none() {
        return Ok(ctx.flash_redirect("/admin", "Please choose a subject."));
    }

    question.image_path = save_upload_image(&config.upload_dir(), form.files.get("image")).await?;

    let id = content::create_question(&pool, &question).await?;
    tracing::info!("Question {} created", id);

    Ok(ctx.flash_redirect("/admin", "Question added."))
}

pub async fn edit_question(
    State(pool): State<SqlitePool>,
    State(views): State<Views>,
    AdminSession { ctx, .. }: AdminSession,
    Path(question_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(q) = content::find_question_with_subject(&pool, question_id).await? else {
        return Ok(ctx.redirect("/admin"));
    };

    ctx.render(
        &views,
        "question_edit.html",
        context! { q => q, choices => Choice::ALL.map(Choice::as_str) },
    )
}

/// Updates a question. Without a new image the stored one is kept.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    AdminSession { ctx, .. }: AdminSession,
    Path(question_id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let edit_url = format!("/admin/questions/{question_id}/edit");
    let form = MultipartForm::read(multipart).await?;

    let mut update = match QuestionForm::from_fields(form.fields).into_update(None) {
        Ok(update) => update,
        Err(msg) => return Ok(ctx.flash_redirect(&edit_url, &msg)),
    };

    if content::find_question(&pool, question_id).await?.is_none() {
        return Ok(ctx.flash_redirect("/admin", "Question not found."));
    }

    update.image_path = save_upload_image(&config.upload_dir(), form.files.get("image")).await?;

    content::update_question(&pool, question_id, &update).await?;
    tracing::info!("Question {} updated", question_id);

    Ok(ctx.flash_redirect(&edit_url, "Question updated."))
}

pub async fn delete_question(
    State(pool): State<SqlitePool>,
    AdminSession { ctx, .. }: AdminSession,
    Path(question_id): Path<i64>,
) -> Result<Response, AppError> {
    if content::delete_question(&pool, question_id).await? {
        tracing::info!("Question {} deleted", question_id);
        Ok(ctx.flash_redirect("/admin", "Question deleted."))
    } else {
        Ok(ctx.flash_redirect("/admin", "Question not found."))
    }
}

/// Publishes a suggestion as a question under the chosen subject and exam.
pub async fn publish_suggestion(
    State(pool): State<SqlitePool>,
    AdminSession { ctx, .. }: AdminSession,
    Path(suggestion_id): Path<i64>,
    Form(payload): Form<PublishSuggestionRequest>,
) -> Result<Response, AppError> {
    let Some(subject_id) = payload
        .subject_id
        .as_deref()
        .and_then(|s| s.trim().parse::<i64>().ok())
    else {
        return Ok(ctx.flash_redirect("/admin", "Please choose a subject."));
    };
    let Some(exam_type) = payload.exam_type.as_deref().and_then(ExamType::parse) else {
        return Ok(ctx.flash_redirect("/admin", "Please choose an exam type."));
    };

    let message = match moderation::publish_suggestion(&pool, suggestion_id, subject_id, exam_type)
        .await?
    {
        PublishOutcome::Published(_) => "Suggestion published as a question.",
        PublishOutcome::SuggestionNotFound => "Suggestion not found.",
        PublishOutcome::AlreadyPublished => "This suggestion was already published.",
        PublishOutcome::SubjectNotFound => "Please choose a subject.",
    };

    Ok(ctx.flash_redirect("/admin", message))
}

pub async fn reject_suggestion(
    State(pool): State<SqlitePool>,
    AdminSession { ctx, .. }: AdminSession,
    Path(suggestion_id): Path<i64>,
) -> Result<Response, AppError> {
    if moderation::reject_suggestion(&pool, suggestion_id).await? {
        Ok(ctx.flash_redirect("/admin", "Suggestion deleted."))
    } else {
        Ok(ctx.flash_redirect("/admin", "Suggestion not found."))
    }
}

/// Corrects the reported question and closes the report.
pub async fn resolve_report(
    State(pool): State<SqlitePool>,
    AdminSession { ctx, .. }: AdminSession,
    Path(report_id): Path<i64>,
    Form(payload): Form<ResolveReportRequest>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Ok(ctx.flash_redirect("/admin", &first_message(&validation_errors)));
    }

    let Some(choice) = payload.correct_choice.as_deref().and_then(Choice::parse) else {
        return Ok(ctx.flash_redirect(
            "/admin",
            "The correct choice must be A, B, C or D.",
        ));
    };

    let message =
        match moderation::resolve_report(&pool, report_id, choice, payload.explanation.as_deref())
            .await?
        {
            ResolveOutcome::Resolved => "Question corrected and report resolved.",
            ResolveOutcome::ReportNotFound => "Report not found.",
        };

    Ok(ctx.flash_redirect("/admin", message))
}
