//! Hand-written fakes for the external collaborators, shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{Config, EmbeddingConfig, JobProviderConfig, KeywordConfig, SearchConfig};
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::jobs::cache::InMemoryQueryCache;
use crate::jobs::fetcher::QueryFetcher;
use crate::jobs::matcher::JobMatcher;
use crate::jobs::posting::JobPosting;
use crate::jobs::provider::{JobSearchProvider, ProviderError};
use crate::keywords::EmbeddingKeywordExtractor;
use crate::resumes::store::InMemoryResumeStore;
use crate::state::AppState;

pub fn posting(id: &str, title: &str) -> JobPosting {
    JobPosting {
        id: Some(id.to_string()),
        title: title.to_string(),
        ..JobPosting::default()
    }
}

/// Job board fake. Unknown queries return no postings.
#[derive(Default)]
pub struct MockProvider {
    results: HashMap<String, Vec<JobPosting>>,
    failures: Vec<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, postings: Vec<JobPosting>) -> Self {
        self.results.insert(query.to_string(), postings);
        self
    }

    pub fn with_failure(mut self, query: &str) -> Self {
        self.failures.push(query.to_string());
        self
    }

    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl JobSearchProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<Vec<JobPosting>, ProviderError> {
        self.calls.lock().unwrap().push(query.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.iter().any(|f| f == query) {
            return Err(ProviderError::Api {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

/// Embedding fake. Texts without a configured vector map to a zero vector.
#[derive(Default)]
pub struct MockEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fail: bool,
    drop_last: bool,
    reject_blank: bool,
    batch_calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Every call fails like an unreachable provider.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Returns one vector fewer than requested.
    pub fn dropping_last(mut self) -> Self {
        self.drop_last = true;
        self
    }

    /// Rejects any batch containing a blank input, like the OpenAI API.
    pub fn rejecting_blank(mut self) -> Self {
        self.reject_blank = true;
        self
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingError::Api {
                status: 401,
                message: "invalid api key".to_string(),
            });
        }
        if self.reject_blank && texts.iter().any(|t| t.trim().is_empty()) {
            return Err(EmbeddingError::Api {
                status: 400,
                message: "input must not be empty".to_string(),
            });
        }
        let mut out: Vec<Vec<f32>> = texts
            .iter()
            .map(|t| self.vectors.get(t).cloned().unwrap_or_else(|| vec![0.0, 0.0]))
            .collect();
        if self.drop_last {
            out.pop();
        }
        Ok(out)
    }
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        rust_log: "debug".to_string(),
        embedding: EmbeddingConfig {
            api_key: "test-key".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            model: "test-model".to_string(),
            timeout: Duration::from_secs(1),
        },
        job_provider: JobProviderConfig::Remotive {
            base_url: "http://127.0.0.1:9".to_string(),
        },
        search: SearchConfig::default(),
        keywords: KeywordConfig::default(),
    }
}

/// Full application state wired to the given fakes, plus a handle on the
/// résumé store for seeding.
pub fn test_state(
    provider: MockProvider,
    embedder: MockEmbedder,
) -> (AppState, Arc<InMemoryResumeStore>) {
    let config = test_config();
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);
    let resumes = Arc::new(InMemoryResumeStore::new());
    let fetcher = QueryFetcher::new(
        Arc::new(provider),
        Arc::new(InMemoryQueryCache::default()),
        config.search.max_concurrent_queries,
        config.search.fetch_timeout,
    );
    let matcher = JobMatcher::new(
        resumes.clone(),
        fetcher,
        embedder.clone(),
        config.search.clone(),
    );
    let extractor = EmbeddingKeywordExtractor::new(embedder.clone(), config.keywords.clone());
    let state = AppState {
        config,
        resumes: resumes.clone(),
        embedder,
        extractor: Arc::new(extractor),
        matcher: Arc::new(matcher),
    };
    (state, resumes)
}
