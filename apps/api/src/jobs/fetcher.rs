//! Concurrent, cache-aware query fetcher.
//!
//! Queries are turned into spawned fetch tasks lazily: a new task is only
//! spawned when the consumer polls the stream and fewer than
//! `max_concurrent` are in flight. Results arrive in completion order.
//!
//! Dropping the stream is the cancellation signal. Nothing new is spawned
//! after that, and tasks already in flight are detached rather than awaited:
//! they run to completion on the runtime and still store their result in the
//! cache, then their output is discarded.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, warn};

use crate::jobs::cache::QueryCache;
use crate::jobs::posting::JobPosting;
use crate::jobs::provider::{JobSearchProvider, ProviderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Provider,
    /// Provider error or timeout; the query counts as zero postings.
    Failed,
}

#[derive(Debug, Clone)]
pub struct FetchedQuery {
    pub query: String,
    pub postings: Vec<JobPosting>,
    pub source: FetchSource,
}

#[derive(Clone)]
pub struct QueryFetcher {
    provider: Arc<dyn JobSearchProvider>,
    cache: Arc<dyn QueryCache>,
    max_concurrent: usize,
    timeout: Duration,
}

impl QueryFetcher {
    pub fn new(
        provider: Arc<dyn JobSearchProvider>,
        cache: Arc<dyn QueryCache>,
        max_concurrent: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            max_concurrent: max_concurrent.max(1),
            timeout,
        }
    }

    /// Number of distinct queries currently memoized.
    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    /// Issues every query once (cache permitting), at most `max_concurrent`
    /// at a time, yielding each result as it completes.
    pub fn fetch_all(&self, queries: Vec<String>) -> BoxStream<'static, FetchedQuery> {
        let provider = Arc::clone(&self.provider);
        let cache = Arc::clone(&self.cache);
        let timeout = self.timeout;

        stream::iter(queries)
            .map(move |query| {
                tokio::spawn(fetch_query(
                    Arc::clone(&provider),
                    Arc::clone(&cache),
                    query,
                    timeout,
                ))
            })
            .buffer_unordered(self.max_concurrent)
            .filter_map(|joined| async move {
                match joined {
                    Ok(fetched) => Some(fetched),
                    Err(e) => {
                        warn!("Fetch task did not complete: {e}");
                        None
                    }
                }
            })
            .boxed()
    }
}

async fn fetch_query(
    provider: Arc<dyn JobSearchProvider>,
    cache: Arc<dyn QueryCache>,
    query: String,
    timeout: Duration,
) -> FetchedQuery {
    if let Some(postings) = cache.lookup(&query) {
        debug!("Cache hit for '{}' ({} postings)", query, postings.len());
        return FetchedQuery {
            query,
            postings,
            source: FetchSource::Cache,
        };
    }

    let result = match tokio::time::timeout(timeout, provider.search(&query)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(timeout)),
    };

    match result {
        Ok(postings) => {
            debug!(
                "{} returned {} postings for '{}'",
                provider.name(),
                postings.len(),
                query
            );
            cache.store(&query, postings.clone());
            FetchedQuery {
                query,
                postings,
                source: FetchSource::Provider,
            }
        }
        Err(e) => {
            warn!("{} query '{}' failed: {e}", provider.name(), query);
            FetchedQuery {
                query,
                postings: Vec::new(),
                source: FetchSource::Failed,
            }
        }
    }
}
