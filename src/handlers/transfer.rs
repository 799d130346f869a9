// src/handlers/transfer.rs

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    services::transfer,
    utils::{session::AdminSession, upload::MultipartForm},
};

/// Downloads the whole bank as `questions.csv`.
pub async fn export_csv(
    State(pool): State<SqlitePool>,
    AdminSession { admin, .. }: AdminSession,
) -> Result<Response, AppError> {
    let body = transfer::export_csv(&pool).await?;
    tracing::info!("CSV export requested by {}", admin.username);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=questions.csv",
            ),
        ],
        body,
    )
        .into_response())
}

/// Imports questions from the uploaded `file` field.
pub async fn import_csv(
    State(pool): State<SqlitePool>,
    AdminSession { ctx, .. }: AdminSession,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = MultipartForm::read(multipart).await?;

    let data = match form.files.remove("file") {
        Some(file) => file.data,
        None => form.fields.remove("file").unwrap_or_default().into_bytes(),
    };
    if data.is_empty() {
        return Ok(ctx.flash_redirect("/admin", "Please choose a CSV file to import."));
    }

    match transfer::import_csv(&pool, &data).await {
        Ok(summary) => Ok(ctx.flash_redirect(
            "/admin",
            &format!("Imported {} questions.", summary.imported),
        )),
        Err(AppError::BadRequest(msg)) => {
            tracing::warn!("CSV import rejected: {}", msg);
            Ok(ctx.flash_redirect("/admin", &msg))
        }
        Err(e) => Err(e),
    }
}
