use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::{IntakeState, UploadedDocument};
use crate::models::JobProfile;
use crate::routes::run_detached;
use crate::state::AppState;

/// Multipart field carrying the job description file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
pub struct SubmitJobRequest {
    /// Replaces the current draft when present.
    #[serde(default)]
    pub raw_text: Option<String>,
}

/// POST /api/v1/sessions/:id/job
pub async fn handle_submit_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitJobRequest>,
) -> Result<Json<JobProfile>, AppError> {
    let handle = state.sessions.get(id).await?;
    let intake = state.intake.clone();
    let profile = run_detached(async move { intake.submit(&handle, req.raw_text).await }).await?;
    Ok(Json(profile))
}

/// POST /api/v1/sessions/:id/job/document
pub async fn handle_upload_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<IntakeState>, AppError> {
    let handle = state.sessions.get(id).await?;
    let document = read_document(&mut multipart).await?;
    let intake = state.intake.load_document(&handle, document).await?;
    Ok(Json(intake))
}

async fn read_document(multipart: &mut Multipart) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read {file_name}: {e}")))?;
        return Ok(UploadedDocument {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(AppError::Validation(format!(
        "Upload must include a '{FILE_FIELD}' field"
    )))
}
