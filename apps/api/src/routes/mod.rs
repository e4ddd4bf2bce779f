pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::jobs::handlers::handle_find_jobs;
use crate::resumes::handlers::handle_upload_resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes", post(handle_upload_resume))
        .route("/api/v1/jobs", post(handle_find_jobs))
        .with_state(state)
}
