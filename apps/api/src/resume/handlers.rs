//! Axum route handlers for resume upload.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::ResumeUploadRow;
use crate::resume::ResumeFormat;
use crate::state::AppState;

/// POST /api/v1/resumes
///
/// Multipart upload of a resume file (pdf/docx/doc). The file is stored on
/// disk and a row recorded; text extraction happens lazily at session start.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadRow>, AppError> {
    let (filename, data) = read_file_field(&mut multipart).await?;

    let format = filename
        .rsplit('.')
        .next()
        .and_then(ResumeFormat::from_extension)
        .ok_or_else(|| {
            AppError::Validation("Invalid file format. Allowed formats: pdf, docx, doc".to_string())
        })?;

    // Keep only the leaf name so a crafted filename cannot escape the
    // upload directory.
    let safe_name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(&filename)
        .to_string();

    let user_dir = std::path::Path::new(&state.config.resume_dir).join(user.id.to_string());
    tokio::fs::create_dir_all(&user_dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create upload dir: {e}")))?;

    let file_path = user_dir.join(&safe_name);
    tokio::fs::write(&file_path, &data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to store resume file: {e}")))?;

    let row = sqlx::query_as::<_, ResumeUploadRow>(
        r#"
        INSERT INTO resume_uploads (id, user_id, filename, file_path, file_format)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(&safe_name)
    .bind(file_path.to_string_lossy().as_ref())
    .bind(format.as_str())
    .fetch_one(&state.db)
    .await?;

    info!(
        "Stored resume {} ({} bytes) for user {}",
        row.id,
        data.len(),
        user.id
    );

    Ok(Json(row))
}

/// Pulls the `file` field out of the multipart body.
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("File field has no filename".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file field: {e}")))?;

        if data.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        return Ok((filename, data));
    }

    Err(AppError::Validation(
        "Multipart body must contain a 'file' field".to_string(),
    ))
}
