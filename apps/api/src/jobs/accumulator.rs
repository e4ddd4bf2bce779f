//! Dedup/accumulate stage between the fetcher and the ranker.
//!
//! This is the single consumer of fetch results, so the seen-set and the
//! accepted list need no locking.

use std::collections::HashSet;

use futures::{Stream, StreamExt};
use tracing::debug;

use crate::jobs::fetcher::FetchedQuery;
use crate::jobs::posting::{JobIdentity, JobPosting};

#[derive(Debug)]
pub struct UniqueAccumulator {
    seen: HashSet<JobIdentity>,
    accepted: Vec<JobPosting>,
    minimum: usize,
}

impl UniqueAccumulator {
    pub fn new(minimum: usize) -> Self {
        Self {
            seen: HashSet::new(),
            accepted: Vec::new(),
            minimum,
        }
    }

    /// Appends `posting` if its identity is new and the minimum has not been
    /// reached yet. Returns whether it was accepted.
    pub fn offer(&mut self, posting: JobPosting) -> bool {
        if self.is_satisfied() {
            return false;
        }
        if !self.seen.insert(posting.identity()) {
            return false;
        }
        self.accepted.push(posting);
        true
    }

    pub fn is_satisfied(&self) -> bool {
        self.accepted.len() >= self.minimum
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn into_postings(self) -> Vec<JobPosting> {
        self.accepted
    }
}

/// Drains fetch results in completion order until `minimum` unique postings
/// are accepted or the stream ends. The stream is dropped on return, which
/// abandons any fetches still outstanding.
pub async fn collect_unique<S>(mut fetched: S, minimum: usize) -> Vec<JobPosting>
where
    S: Stream<Item = FetchedQuery> + Unpin,
{
    let mut accumulator = UniqueAccumulator::new(minimum);
    let mut completed = 0usize;

    while let Some(batch) = fetched.next().await {
        completed += 1;
        debug!(
            "Query '{}' yielded {} postings ({:?})",
            batch.query,
            batch.postings.len(),
            batch.source
        );
        for posting in batch.postings {
            if !accumulator.offer(posting) && accumulator.is_satisfied() {
                break;
            }
        }
        if accumulator.is_satisfied() {
            debug!(
                "Reached {} unique postings after {} queries; abandoning the rest",
                accumulator.len(),
                completed
            );
            break;
        }
    }

    accumulator.into_postings()
}
