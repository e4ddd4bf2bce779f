use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::resumes::ingest::{ingest_resume, UploadResumeRequest, UploadResumeResponse};
use crate::state::AppState;

/// POST /api/v1/resumes
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Json(req): Json<UploadResumeRequest>,
) -> Result<Json<UploadResumeResponse>, AppError> {
    let response = ingest_resume(
        req.text.as_deref(),
        state.extractor.as_ref(),
        state.embedder.as_ref(),
        state.resumes.as_ref(),
    )
    .await?;
    Ok(Json(response))
}
