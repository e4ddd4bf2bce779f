mod config;
mod embedding;
mod errors;
mod jobs;
mod keywords;
mod models;
mod resumes;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, JobProviderConfig};
use crate::embedding::openai::OpenAiEmbeddingProvider;
use crate::embedding::EmbeddingProvider;
use crate::jobs::cache::InMemoryQueryCache;
use crate::jobs::fetcher::QueryFetcher;
use crate::jobs::matcher::JobMatcher;
use crate::jobs::provider::catho::CathoProvider;
use crate::jobs::provider::remotive::RemotiveProvider;
use crate::jobs::provider::JobSearchProvider;
use crate::keywords::EmbeddingKeywordExtractor;
use crate::resumes::store::InMemoryResumeStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireSearcher API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize embedding provider
    let openai = OpenAiEmbeddingProvider::new(&config.embedding)
        .context("Failed to build embedding client")?;
    info!("Embedding provider initialized (model: {})", openai.model());
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(openai);

    // Initialize job board client
    let provider = build_job_provider(&config)?;
    info!("Job provider initialized: {}", provider.name());

    let search = config.search.clone();
    info!(
        "Search settings: combo<={} parallel={} min_unique={} top_k={} timeout={}s",
        search.max_combo_size,
        search.max_concurrent_queries,
        search.min_unique_postings,
        search.top_k,
        search.fetch_timeout.as_secs()
    );

    let cache = Arc::new(InMemoryQueryCache::new(search.cache_capacity, search.cache_ttl));
    let fetcher = QueryFetcher::new(
        provider,
        cache,
        search.max_concurrent_queries,
        search.fetch_timeout,
    );
    let resumes = Arc::new(InMemoryResumeStore::new());
    let matcher = JobMatcher::new(resumes.clone(), fetcher, embedder.clone(), search);
    let extractor = EmbeddingKeywordExtractor::new(embedder.clone(), config.keywords.clone());

    // Build app state
    let state = AppState {
        config: config.clone(),
        resumes,
        embedder,
        extractor: Arc::new(extractor),
        matcher: Arc::new(matcher),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// The fetch timeout doubles as the HTTP client timeout so a hung
/// connection cannot outlive the per-query deadline.
fn build_job_provider(config: &Config) -> Result<Arc<dyn JobSearchProvider>> {
    let timeout = config.search.fetch_timeout;
    let provider: Arc<dyn JobSearchProvider> = match &config.job_provider {
        JobProviderConfig::Remotive { base_url } => Arc::new(
            RemotiveProvider::new(base_url, timeout).context("Failed to build Remotive client")?,
        ),
        JobProviderConfig::Catho {
            base_url,
            client_id,
            client_secret,
        } => Arc::new(
            CathoProvider::new(base_url, client_id.clone(), client_secret.clone(), timeout)
                .context("Failed to build Catho client")?,
        ),
    };
    Ok(provider)
}
