//! Job matcher: the end-to-end résumé → ranked jobs pipeline.
//!
//! plan queries → fetch concurrently (cache-aware) → dedup with early stop
//! → embed + rank → shape for the response.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::SearchConfig;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::jobs::accumulator::collect_unique;
use crate::jobs::fetcher::QueryFetcher;
use crate::jobs::planner::plan_queries;
use crate::jobs::ranker::{rank_postings, ScoredPosting};
use crate::jobs::sanitize::sanitize_description;
use crate::resumes::store::ResumeStore;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("resume_id is required")]
    MissingResumeId,

    #[error("resume '{0}' not found")]
    ResumeNotFound(String),

    #[error("resume cannot be matched: {0}")]
    InvalidResume(String),

    #[error("job matching failed: {0}")]
    ProviderFailure(String),

    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),
}

/// One ranked job in the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedJob {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Markup stripped, line breaks as `<br>`.
    pub description: String,
    /// Cosine similarity rounded to 4 decimal places.
    pub similarity: f64,
}

impl From<ScoredPosting> for MatchedJob {
    fn from(scored: ScoredPosting) -> Self {
        let posting = scored.posting;
        Self {
            description: sanitize_description(Some(&posting.description)),
            title: posting.title,
            company: posting.company,
            location: posting.location,
            similarity: round4(scored.similarity as f64),
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub struct JobMatcher {
    resumes: Arc<dyn ResumeStore>,
    fetcher: QueryFetcher,
    embedder: Arc<dyn EmbeddingProvider>,
    settings: SearchConfig,
}

impl JobMatcher {
    pub fn new(
        resumes: Arc<dyn ResumeStore>,
        fetcher: QueryFetcher,
        embedder: Arc<dyn EmbeddingProvider>,
        settings: SearchConfig,
    ) -> Self {
        Self {
            resumes,
            fetcher,
            embedder,
            settings,
        }
    }

    /// Finds the postings closest to a stored résumé.
    ///
    /// Input errors are raised before any provider is contacted. A résumé
    /// with no usable search terms, or a search that finds nothing, is an
    /// empty list rather than an error.
    pub async fn find_matching_jobs(
        &self,
        resume_id: Option<&str>,
    ) -> Result<Vec<MatchedJob>, MatchError> {
        let resume_id = resume_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(MatchError::MissingResumeId)?;

        let id = Uuid::parse_str(resume_id)
            .map_err(|_| MatchError::ResumeNotFound(resume_id.to_string()))?;
        let resume = self
            .resumes
            .get(id)
            .await
            .ok_or_else(|| MatchError::ResumeNotFound(resume_id.to_string()))?;

        if resume.embedding.is_empty() {
            return Err(MatchError::InvalidResume(
                "stored resume has no embedding".to_string(),
            ));
        }

        let queries = plan_queries(&resume.keywords, self.settings.max_combo_size);
        if queries.is_empty() {
            info!("Resume {id}: no usable search terms, skipping job search");
            return Ok(Vec::new());
        }

        let query_count = queries.len();
        let fetched = self.fetcher.fetch_all(queries);
        let postings = collect_unique(fetched, self.settings.min_unique_postings).await;
        info!(
            "Resume {id}: {} unique postings from {} planned queries ({} queries cached)",
            postings.len(),
            query_count,
            self.fetcher.cached_queries()
        );
        if postings.is_empty() {
            return Ok(Vec::new());
        }

        let ranked = rank_postings(
            self.embedder.as_ref(),
            &resume.embedding,
            postings,
            self.settings.top_k,
        )
        .await?;

        Ok(ranked.into_iter().map(MatchedJob::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::jobs::cache::InMemoryQueryCache;
    use crate::jobs::posting::JobPosting;
    use crate::models::resume::Resume;
    use crate::resumes::store::InMemoryResumeStore;
    use crate::testing::{posting, MockEmbedder, MockProvider};

    struct Harness {
        matcher: JobMatcher,
        provider: Arc<MockProvider>,
        embedder: Arc<MockEmbedder>,
        store: Arc<InMemoryResumeStore>,
    }

    fn harness(provider: MockProvider, embedder: MockEmbedder, settings: SearchConfig) -> Harness {
        let provider = Arc::new(provider);
        let embedder = Arc::new(embedder);
        let store = Arc::new(InMemoryResumeStore::new());
        let fetcher = QueryFetcher::new(
            provider.clone(),
            Arc::new(InMemoryQueryCache::default()),
            settings.max_concurrent_queries,
            settings.fetch_timeout,
        );
        let matcher = JobMatcher::new(store.clone(), fetcher, embedder.clone(), settings);
        Harness {
            matcher,
            provider,
            embedder,
            store,
        }
    }

    async fn store_resume(store: &InMemoryResumeStore, keywords: &[&str], embedding: Vec<f32>) -> String {
        let resume = Resume::new(
            None,
            keywords.iter().map(|k| k.to_string()).collect(),
            embedding,
        );
        let id = resume.id.to_string();
        store.insert(resume).await;
        id
    }

    fn described(id: &str, title: &str, description: &str) -> JobPosting {
        JobPosting {
            description: description.to_string(),
            company: format!("{title} Inc"),
            location: "Worldwide".to_string(),
            ..posting(id, title)
        }
    }

    #[tokio::test]
    async fn test_missing_resume_id() {
        let h = harness(MockProvider::new(), MockEmbedder::new(), SearchConfig::default());
        for id in [None, Some(""), Some("   ")] {
            let err = h.matcher.find_matching_jobs(id).await.unwrap_err();
            assert!(matches!(err, MatchError::MissingResumeId));
        }
        assert!(h.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_resume_id() {
        let h = harness(MockProvider::new(), MockEmbedder::new(), SearchConfig::default());
        let unknown = Uuid::new_v4().to_string();
        for id in [unknown.as_str(), "not-a-uuid"] {
            let err = h.matcher.find_matching_jobs(Some(id)).await.unwrap_err();
            assert!(matches!(err, MatchError::ResumeNotFound(_)));
        }
        assert!(h.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resume_without_embedding_is_invalid() {
        let h = harness(MockProvider::new(), MockEmbedder::new(), SearchConfig::default());
        let id = store_resume(&h.store, &["python developer"], vec![]).await;
        let err = h.matcher.find_matching_jobs(Some(&id)).await.unwrap_err();
        assert!(matches!(err, MatchError::InvalidResume(_)));
    }

    #[tokio::test]
    async fn test_short_keywords_skip_provider() {
        let h = harness(MockProvider::new(), MockEmbedder::new(), SearchConfig::default());
        let id = store_resume(&h.store, &["go", "sql", "aws"], vec![1.0, 0.0]).await;
        let jobs = h.matcher.find_matching_jobs(Some(&id)).await.unwrap();
        assert!(jobs.is_empty());
        assert!(h.provider.calls().is_empty());
        assert_eq!(h.embedder.batch_calls(), 0);
    }

    #[tokio::test]
    async fn test_python_developer_scenario() {
        let provider = MockProvider::new().with_results(
            "python developer",
            vec![
                described("1", "Python Developer", "<p>Django\nAPIs</p>"),
                described("2", "Data Engineer", "spark pipelines"),
                described("3", "Backend Engineer", "python services"),
            ],
        );
        let embedder = MockEmbedder::new()
            .with_vector("Django APIs", vec![0.9, 0.1])
            .with_vector("spark pipelines", vec![0.1, 0.9])
            .with_vector("python services", vec![1.0, 0.0]);
        let h = harness(provider, embedder, SearchConfig::default());
        let id = store_resume(
            &h.store,
            &["python developer", "backend engineer"],
            vec![1.0, 0.0],
        )
        .await;

        let jobs = h.matcher.find_matching_jobs(Some(&id)).await.unwrap();

        // min of 5 never reached, so all ten planned queries ran.
        assert_eq!(h.provider.calls().len(), 10);
        assert_eq!(h.embedder.batch_calls(), 1);
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].title, "Backend Engineer");
        assert_eq!(jobs[0].similarity, 1.0);
        assert_eq!(jobs[1].title, "Python Developer");
        assert_eq!(jobs[1].description, "Django<br>APIs");
        assert_eq!(jobs[1].company, "Python Developer Inc");
        assert_eq!(jobs[1].location, "Worldwide");
        assert!(jobs.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[tokio::test]
    async fn test_duplicates_across_queries_counted_once() {
        let shared = vec![described("1", "A", "x"), described("2", "B", "y")];
        let provider = MockProvider::new()
            .with_results("rust developer", shared.clone())
            .with_results("rust", shared.clone())
            .with_results("developer", shared);
        let settings = SearchConfig {
            top_k: 10,
            ..SearchConfig::default()
        };
        let h = harness(provider, MockEmbedder::new(), settings);
        let id = store_resume(&h.store, &["rust developer"], vec![1.0, 0.0]).await;

        let jobs = h.matcher.find_matching_jobs(Some(&id)).await.unwrap();
        assert_eq!(jobs.len(), 2);
    }

    #[tokio::test]
    async fn test_early_stop_caps_unique_postings() {
        let many: Vec<JobPosting> = (0..8)
            .map(|i| described(&i.to_string(), &format!("Job {i}"), "text"))
            .collect();
        let provider = MockProvider::new().with_results("rust tokio", many);
        let settings = SearchConfig {
            max_concurrent_queries: 1,
            top_k: 10,
            ..SearchConfig::default()
        };
        let h = harness(provider, MockEmbedder::new(), settings);
        let id = store_resume(&h.store, &["rust", "tokio"], vec![1.0, 0.0]).await;

        let jobs = h.matcher.find_matching_jobs(Some(&id)).await.unwrap();
        assert_eq!(jobs.len(), 5);
        // With one query in flight, the pair query alone satisfied the minimum.
        assert!(h.provider.calls().len() <= 2);
    }

    #[tokio::test]
    async fn test_all_queries_failing_is_empty_not_error() {
        let provider = MockProvider::new()
            .with_failure("rust tokio")
            .with_failure("rust")
            .with_failure("tokio");
        let h = harness(provider, MockEmbedder::new(), SearchConfig::default());
        let id = store_resume(&h.store, &["rust tokio"], vec![1.0, 0.0]).await;

        let jobs = h.matcher.find_matching_jobs(Some(&id)).await.unwrap();
        assert!(jobs.is_empty());
        assert_eq!(h.embedder.batch_calls(), 0);
    }

    #[tokio::test]
    async fn test_embedding_outage_surfaces() {
        let provider = MockProvider::new().with_results("kubernetes", vec![described("1", "SRE", "k8s")]);
        let h = harness(provider, MockEmbedder::new().failing(), SearchConfig::default());
        let id = store_resume(&h.store, &["kubernetes"], vec![1.0, 0.0]).await;

        let err = h.matcher.find_matching_jobs(Some(&id)).await.unwrap_err();
        assert!(matches!(err, MatchError::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn test_second_search_served_from_cache() {
        let provider = MockProvider::new().with_results("kubernetes", vec![described("1", "SRE", "k8s")]);
        let h = harness(provider, MockEmbedder::new(), SearchConfig::default());
        let id = store_resume(&h.store, &["kubernetes"], vec![1.0, 0.0]).await;

        h.matcher.find_matching_jobs(Some(&id)).await.unwrap();
        let jobs = h.matcher.find_matching_jobs(Some(&id)).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(h.provider.calls(), vec!["kubernetes"]);
    }

    #[test]
    fn test_similarity_rounded_to_four_places() {
        let job = MatchedJob::from(ScoredPosting {
            posting: posting("1", "t"),
            similarity: 0.123_456,
        });
        assert_eq!(job.similarity, 0.1235);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout_from_settings() {
        let provider = MockProvider::new()
            .with_results("kubernetes", vec![described("1", "SRE", "k8s")])
            .with_delay("kubernetes", Duration::from_secs(30));
        let h = harness(provider, MockEmbedder::new(), SearchConfig::default());
        let id = store_resume(&h.store, &["kubernetes"], vec![1.0, 0.0]).await;

        let jobs = h.matcher.find_matching_jobs(Some(&id)).await.unwrap();
        assert!(jobs.is_empty());
    }
}
