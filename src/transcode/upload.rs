use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, Multipart};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::constants::{ERR_NO_VIDEO, ERR_VIDEO_TYPE, VIDEO_FIELD_NAME};
use crate::error::{AppError, Result};
use crate::models::{now_micros, MediaType};
use crate::uploads::UploadLayout;

/// A client upload written to the staging directory
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub path: PathBuf,
    pub stored_name: String,
    pub original_name: String,
    pub media_type: MediaType,
    pub size: u64,
    /// Optional `title` form field
    pub title: Option<String>,
}

impl StagedUpload {
    /// Remove the staged file, logging instead of failing
    pub async fn discard(&self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove staged upload {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Stream the `video` field of a multipart body into the staging directory
///
/// The content type is checked before anything touches the disk. A partially
/// written file is removed when the body fails mid-stream, including when it
/// runs over the size limit.
pub async fn stage_upload(multipart: &mut Multipart, layout: &UploadLayout) -> Result<StagedUpload> {
    let mut staged: Option<StagedUpload> = None;
    let mut title: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                if let Some(upload) = &staged {
                    upload.discard().await;
                }
                return Err(e.into());
            }
        };

        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(VIDEO_FIELD_NAME) if staged.is_none() => {
                staged = Some(stage_field(field, layout).await?);
            }
            Some("title") => match field.text().await {
                Ok(text) => title = Some(text),
                Err(e) => {
                    if let Some(upload) = &staged {
                        upload.discard().await;
                    }
                    return Err(e.into());
                }
            },
            _ => {}
        }
    }

    let mut upload = staged.ok_or_else(|| AppError::Validation(ERR_NO_VIDEO.to_string()))?;
    upload.title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    Ok(upload)
}

async fn stage_field(mut field: Field<'_>, layout: &UploadLayout) -> Result<StagedUpload> {
    let media_type = field
        .content_type()
        .and_then(MediaType::from_upload_mime)
        .ok_or_else(|| AppError::Validation(ERR_VIDEO_TYPE.to_string()))?;

    let original_name = field.file_name().unwrap_or("video").to_string();
    let stored_name = staged_name(&original_name);
    let path = layout.staging_dir().join(&stored_name);

    tokio::fs::create_dir_all(layout.staging_dir()).await?;

    let size = match write_chunks(&mut field, &path).await {
        Ok(size) => size,
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                tracing::warn!("Failed to remove partial upload {}: {}", path.display(), remove_err);
            }
            return Err(e);
        }
    };

    tracing::info!(
        original_name = %original_name,
        stored_name = %stored_name,
        size,
        "Upload staged"
    );

    Ok(StagedUpload {
        path,
        stored_name,
        original_name,
        media_type,
        size,
        title: None,
    })
}

async fn write_chunks(field: &mut Field<'_>, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut size = 0u64;

    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(size)
}

/// `<millis>-<uuid><ext>`, keeping the client's extension
fn staged_name(original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{}-{}{}", now_micros() / 1000, Uuid::new_v4(), ext)
}
