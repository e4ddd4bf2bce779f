use std::sync::Arc;

use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::jobs::matcher::JobMatcher;
use crate::keywords::KeywordExtractor;
use crate::resumes::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every component is built once at startup and shared by reference.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub resumes: Arc<dyn ResumeStore>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// Pluggable keyword extractor. Default: EmbeddingKeywordExtractor.
    pub extractor: Arc<dyn KeywordExtractor>,
    pub matcher: Arc<JobMatcher>,
}
