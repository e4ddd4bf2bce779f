//! Query cache: memoizes provider results per exact query string.
//!
//! Lookup-then-store is not atomic: two fetches of the same query in one batch
//! may both miss and both store (last write wins). Results are idempotent per
//! query, so that is harmless.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::jobs::posting::JobPosting;

pub trait QueryCache: Send + Sync {
    fn lookup(&self, query: &str) -> Option<Vec<JobPosting>>;
    fn store(&self, query: &str, postings: Vec<JobPosting>);
    fn len(&self) -> usize;
}

#[derive(Debug)]
struct CacheEntry {
    postings: Vec<JobPosting>,
    stored_at: Instant,
}

/// Process-lifetime cache on a sharded concurrent map.
///
/// Unbounded with no expiry by default. With a capacity set, storing a new
/// key into a full cache evicts the oldest entry first. With a TTL set, stale
/// entries are treated as misses and dropped on lookup.
#[derive(Debug, Default)]
pub struct InMemoryQueryCache {
    entries: DashMap<String, CacheEntry>,
    capacity: Option<usize>,
    ttl: Option<Duration>,
}

impl InMemoryQueryCache {
    pub fn new(capacity: Option<usize>, ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            ttl,
        }
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .map(|ttl| entry.stored_at.elapsed() > ttl)
            .unwrap_or(false)
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.stored_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

impl QueryCache for InMemoryQueryCache {
    fn lookup(&self, query: &str) -> Option<Vec<JobPosting>> {
        {
            let entry = self.entries.get(query)?;
            if !self.is_expired(entry.value()) {
                return Some(entry.postings.clone());
            }
        }
        self.entries
            .remove_if(query, |_, entry| self.is_expired(entry));
        None
    }

    fn store(&self, query: &str, postings: Vec<JobPosting>) {
        if let Some(capacity) = self.capacity {
            if !self.entries.contains_key(query) && self.entries.len() >= capacity {
                self.evict_oldest();
            }
        }
        self.entries.insert(
            query.to_string(),
            CacheEntry {
                postings,
                stored_at: Instant::now(),
            },
        );
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
