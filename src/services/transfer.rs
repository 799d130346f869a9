// src/services/transfer.rs
//
// CSV export and import of the whole question bank.

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::question::{Choice, ExamType, NewQuestion, QuestionWithSubject, Source},
    services::content,
};

pub const CSV_HEADER: [&str; 12] = [
    "id",
    "subject",
    "exam_type",
    "question_text",
    "choice_a",
    "choice_b",
    "choice_c",
    "choice_d",
    "correct_choice",
    "image_path",
    "source",
    "explanation",
];

/// Result of an import run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows without a subject name.
    pub skipped: usize,
}

/// One CSV row as read. Every column is optional; `id` is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImportRow {
    subject: Option<String>,
    exam_type: Option<String>,
    question_text: Option<String>,
    choice_a: Option<String>,
    choice_b: Option<String>,
    choice_c: Option<String>,
    choice_d: Option<String>,
    correct_choice: Option<String>,
    image_path: Option<String>,
    source: Option<String>,
    explanation: Option<String>,
}

impl ImportRow {
    fn into_question(self, subject_id: i64) -> NewQuestion {
        NewQuestion {
            subject_id,
            exam_type: self
                .exam_type
                .as_deref()
                .and_then(ExamType::parse)
                .unwrap_or(ExamType::Mid),
            question_text: self.question_text.unwrap_or_default(),
            choice_a: self.choice_a.unwrap_or_default(),
            choice_b: self.choice_b.unwrap_or_default(),
            choice_c: self.choice_c.unwrap_or_default(),
            choice_d: self.choice_d.unwrap_or_default(),
            correct_choice: self
                .correct_choice
                .as_deref()
                .and_then(Choice::parse)
                .unwrap_or(Choice::A),
            image_path: self.image_path.filter(|p| !p.trim().is_empty()),
            source: Source::parse_or_default(self.source.as_deref()),
            explanation: self.explanation.filter(|e| !e.trim().is_empty()),
        }
    }
}

/// Serializes every question, oldest first. The header row is always written.
pub async fn export_csv(pool: &SqlitePool) -> Result<Vec<u8>, AppError> {
    let questions = sqlx::query_as::<_, QuestionWithSubject>(
        r#"
        SELECT q.*, s.name AS subject_name
        FROM questions q
        JOIN subjects s ON s.id = q.subject_id
        ORDER BY q.id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for row in &questions {
        let q = &row.question;
        writer.write_record([
            q.id.to_string().as_str(),
            row.subject_name.as_str(),
            q.exam_type.as_str(),
            q.question_text.as_str(),
            q.choice_a.as_str(),
            q.choice_b.as_str(),
            q.choice_c.as_str(),
            q.choice_d.as_str(),
            q.correct_choice.as_str(),
            q.image_path.as_deref().unwrap_or(""),
            q.source.as_str(),
            q.explanation.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!("Exported {} questions", questions.len());
    Ok(bytes)
}

/// Imports questions from CSV text with the export's column names.
///
/// Subjects are created by name as needed. The whole file is applied in one
/// transaction, so a malformed row leaves the bank untouched.
pub async fn import_csv(pool: &SqlitePool, data: &[u8]) -> Result<ImportSummary, AppError> {
    let text = std::str::from_utf8(data)
        .map_err(|_| AppError::BadRequest("The CSV file must be UTF-8 encoded.".to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut summary = ImportSummary::default();
    let mut tx = pool.begin().await?;

    for record in reader.deserialize::<ImportRow>() {
        let row = record?;

        let Some(subject) = row
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
        else {
            summary.skipped += 1;
            continue;
        };

        let subject_id = content::subject_id_for_name(&mut *tx, &subject).await?;
        content::create_question(&mut *tx, &row.into_question(subject_id)).await?;
        summary.imported += 1;
    }

    tx.commit().await?;

    tracing::info!(
        "Imported {} questions ({} rows skipped)",
        summary.imported,
        summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, services::test_support::*};

    #[tokio::test]
    async fn empty_bank_exports_only_the_header() {
        let pool = db::memory_pool().await.unwrap();
        let bytes = export_csv(&pool).await.unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "id,subject,exam_type,question_text,choice_a,choice_b,choice_c,choice_d,correct_choice,image_path,source,explanation\n"
        );
    }

    type FieldValues = (
        String,
        ExamType,
        String,
        [String; 4],
        Choice,
        Option<String>,
        Source,
        Option<String>,
    );

    /// Everything a question carries apart from its id and timestamps.
    fn field_values(q: &QuestionWithSubject) -> FieldValues {
        let question = &q.question;
        (
            q.subject_name.clone(),
            question.exam_type,
            question.question_text.clone(),
            [
                question.choice_a.clone(),
                question.choice_b.clone(),
                question.choice_c.clone(),
                question.choice_d.clone(),
            ],
            question.correct_choice,
            question.image_path.clone(),
            question.source,
            question.explanation.clone(),
        )
    }

    #[tokio::test]
    async fn exported_file_imports_into_a_fresh_bank() {
        let source = db::memory_pool().await.unwrap();
        let s = subject(&source, "Chemistry").await;
        question(&source, s, "Symbol for gold, \"Au\" or \"Ag\"?").await;

        let mut with_image = new_question(s, "Which flask?");
        with_image.exam_type = ExamType::Final;
        with_image.choice_a = "Erlenmeyer, conical".into();
        with_image.choice_b = "Round\nbottom".into();
        with_image.choice_c = "Volumetric".into();
        with_image.choice_d = "Florence".into();
        with_image.correct_choice = Choice::D;
        with_image.image_path = Some("uploads/flask.png".into());
        with_image.source = Source::Ai;
        with_image.explanation = None;
        content::create_question(&source, &with_image).await.unwrap();

        let csv = export_csv(&source).await.unwrap();

        let target = db::memory_pool().await.unwrap();
        let summary = import_csv(&target, &csv).await.unwrap();
        assert_eq!(summary, ImportSummary { imported: 2, skipped: 0 });

        let exported: Vec<FieldValues> = content::recent_questions(&source, 10)
            .await
            .unwrap()
            .iter()
            .map(field_values)
            .collect();
        let imported: Vec<FieldValues> = content::recent_questions(&target, 10)
            .await
            .unwrap()
            .iter()
            .map(field_values)
            .collect();

        assert_eq!(imported.len(), 2);
        assert_eq!(imported, exported);
        assert_eq!(imported[0].1, ExamType::Final);
        assert_eq!(imported[0].7, None);
        assert_eq!(imported[1].7.as_deref(), Some("because"));
    }

    #[tokio::test]
    async fn import_applies_defaults_and_skips_rows_without_subject() {
        let pool = db::memory_pool().await.unwrap();
        let data = "\u{feff}subject,question_text,exam_type,correct_choice,source\n\
                    Physics,What is g?,midterm,Z,unknown\n\
                    ,orphan row,final,B,past\n\
                    Physics,Short row\n";

        let summary = import_csv(&pool, data.as_bytes()).await.unwrap();
        assert_eq!(summary, ImportSummary { imported: 2, skipped: 1 });

        let subjects = content::list_subjects(&pool).await.unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].name, "Physics");

        let questions = content::recent_questions(&pool, 10).await.unwrap();
        let first = &questions[1].question;
        assert_eq!(first.question_text, "What is g?");
        assert_eq!(first.exam_type, ExamType::Mid);
        assert_eq!(first.correct_choice, Choice::A);
        assert_eq!(first.source, Source::Past);
        assert_eq!(first.choice_a, "");
        assert_eq!(first.explanation, None);
    }

    #[tokio::test]
    async fn import_reuses_existing_subjects() {
        let pool = db::memory_pool().await.unwrap();
        let s = subject(&pool, "Biology").await;

        let data = "subject,question_text\nBiology,Cells?\nBiology,DNA?\n";
        import_csv(&pool, data.as_bytes()).await.unwrap();

        let summaries = content::subject_summaries(&pool).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, s);
        assert_eq!(summaries[0].question_count, 2);
    }

    #[tokio::test]
    async fn non_utf8_input_is_rejected() {
        let pool = db::memory_pool().await.unwrap();
        let err = import_csv(&pool, &[0xff, 0xfe, 0x00]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
