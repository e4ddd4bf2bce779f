use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::embedding::EmbeddingProvider;
use crate::errors::AppError;
use crate::keywords::KeywordExtractor;
use crate::models::resume::Resume;
use crate::resumes::store::ResumeStore;

#[derive(Debug, Deserialize)]
pub struct UploadResumeRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResumeResponse {
    pub resume_id: Uuid,
    pub keywords: Vec<String>,
}

/// Extracts keywords, embeds the full text once, and stores the résumé.
pub async fn ingest_resume(
    text: Option<&str>,
    extractor: &dyn KeywordExtractor,
    embedder: &dyn EmbeddingProvider,
    store: &dyn ResumeStore,
) -> Result<UploadResumeResponse, AppError> {
    let text = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("text is required".to_string()))?;

    let keywords = extractor.extract(text).await?;
    let embedding = embedder.embed(text).await?;

    let resume = Resume::new(Some(text.to_string()), keywords.clone(), embedding);
    let resume_id = resume.id;
    let text_chars = resume.text.as_deref().map_or(0, |t| t.chars().count());
    let created_at = resume.created_at;
    if !store.insert(resume).await {
        return Err(AppError::Internal(anyhow::anyhow!(
            "resume id {resume_id} already taken"
        )));
    }

    info!(
        "Stored resume {resume_id} at {created_at} ({text_chars} chars, {} keywords)",
        keywords.len()
    );
    Ok(UploadResumeResponse {
        resume_id,
        keywords,
    })
}
