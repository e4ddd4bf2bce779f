use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::jobs::matcher::MatchedJob;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FindJobsRequest {
    #[serde(default)]
    pub resume_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FindJobsResponse {
    pub status: &'static str,
    pub jobs: Vec<MatchedJob>,
}

/// POST /api/v1/jobs
pub async fn handle_find_jobs(
    State(state): State<AppState>,
    Json(req): Json<FindJobsRequest>,
) -> Result<Json<FindJobsResponse>, AppError> {
    let jobs = state
        .matcher
        .find_matching_jobs(req.resume_id.as_deref())
        .await?;
    Ok(Json(FindJobsResponse {
        status: "success",
        jobs,
    }))
}
