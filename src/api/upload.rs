//! Multipart form handling and image upload placement
//!
//! Admin product/category forms arrive as multipart bodies mixing text
//! fields with image files. File parts are written to the uploads
//! directory under a generated name and become `/uploads/<name>` reference
//! strings; the stores only ever see those references, never file bytes.

use std::collections::HashMap;
use std::path::Path;

use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::error::ApiError;

/// Maximum accepted file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Accepted image extensions
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

pub struct UploadedImage {
    /// Client-side file name, used to match variant image entries.
    pub original_name: String,
    /// Stored reference, `/uploads/<generated name>`.
    pub reference: String,
}

/// A drained multipart request: text fields by name, plus any stored
/// uploads.
pub struct SubmittedForm {
    fields: HashMap<String, String>,
    pub uploads: Vec<UploadedImage>,
}

impl SubmittedForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Checkbox-style flag, sent as the literal string "true".
    pub fn flag(&self, name: &str) -> bool {
        self.text(name) == Some("true")
    }

    /// Parses a field that carries JSON (arrays of sizes, colors, variant
    /// mappings). Absent or blank fields read as `None`.
    pub fn parsed<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
        match self.text(name).filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| ApiError::BadRequest(format!("invalid {name}: {e}"))),
            None => Ok(None),
        }
    }

    pub fn upload_refs(&self) -> Vec<String> {
        self.uploads.iter().map(|u| u.reference.clone()).collect()
    }
}

/// Drains a multipart body. Parts named `file_field` that carry a file name
/// are saved as images; every other part is collected as text.
pub async fn collect_form(
    uploads_dir: &Path,
    mut multipart: Multipart,
    file_field: &str,
) -> Result<SubmittedForm, ApiError> {
    let mut fields = HashMap::new();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .file_name()
            .filter(|f| !f.is_empty())
            .map(str::to_string);

        if name == file_field {
            if let Some(original_name) = file_name {
                let data = field.bytes().await?;
                let reference = save_image(uploads_dir, &original_name, &data).await?;
                uploads.push(UploadedImage {
                    original_name,
                    reference,
                });
                continue;
            }
        }
        fields.insert(name, field.text().await?);
    }

    Ok(SubmittedForm { fields, uploads })
}

async fn save_image(
    uploads_dir: &Path,
    original_name: &str,
    data: &[u8],
) -> Result<String, ApiError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(ApiError::BadRequest(format!(
            "file too large, maximum size is {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "unsupported image format: {original_name}"
        )));
    }

    fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to create uploads dir: {e}")))?;

    let filename = format!("{}.{ext}", Uuid::new_v4());
    fs::write(uploads_dir.join(&filename), data)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to store upload: {e}")))?;

    debug!(%original_name, %filename, size = data.len(), "image stored");
    Ok(format!("/uploads/{filename}"))
}
