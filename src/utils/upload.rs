// src/utils/upload.rs

use std::path::Path;

use axum::extract::Multipart;
use std::collections::HashMap;

use crate::error::AppError;

/// Extensions accepted for question images.
pub const ALLOWED_IMAGE_EXTS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "jfif"];

/// Extension used when the browser says "image/*" but the name has none we know.
pub const FALLBACK_IMAGE_EXT: &str = "jpg";

/// A file field read fully into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Multipart body split into text fields and the named file fields.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    /// Drains a multipart body. Fields with a file name are kept as files.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            if name.is_empty() {
                continue;
            }

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;
                    form.files.insert(
                        name,
                        UploadedFile {
                            file_name: Some(file_name),
                            content_type,
                            data: data.to_vec(),
                        },
                    );
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }
}

/// Decides the stored extension for an upload, or `None` to ignore it.
pub fn image_extension(file_name: &str, content_type: Option<&str>) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if let Some(known) = ALLOWED_IMAGE_EXTS.iter().find(|allowed| **allowed == ext) {
        return Some(*known);
    }

    match content_type {
        Some(ct) if ct.starts_with("image/") => Some(FALLBACK_IMAGE_EXT),
        _ => None,
    }
}

/// Writes an accepted image under `upload_dir` with a random name.
///
/// Returns the path relative to the static root (`uploads/<name>.<ext>`), or
/// `None` when there is no file or it is not an image.
pub async fn save_upload_image(
    upload_dir: &Path,
    file: Option<&UploadedFile>,
) -> Result<Option<String>, AppError> {
    let Some(file) = file else {
        return Ok(None);
    };

    let file_name = match file.file_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => return Ok(None),
    };

    if file.data.is_empty() {
        return Ok(None);
    }

    let Some(ext) = image_extension(file_name, file.content_type.as_deref()) else {
        tracing::info!("Ignoring non-image upload {:?}", file_name);
        return Ok(None);
    };

    let name = format!("{}.{}", uuid::Uuid::new_v4().simple(), ext);
    tokio::fs::create_dir_all(upload_dir).await?;
    tokio::fs::write(upload_dir.join(&name), &file.data).await?;

    Ok(Some(format!("uploads/{name}")))
}
