//! External job boards.
//!
//! Every board sits behind `JobSearchProvider`; the fetcher never knows which
//! one it is talking to. Postings are normalized into `JobPosting` before they
//! leave the provider.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::jobs::posting::JobPosting;

pub mod catho;
pub mod remotive;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait JobSearchProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs one query. An empty vec is a valid "nothing matched".
    async fn search(&self, query: &str) -> Result<Vec<JobPosting>, ProviderError>;
}

/// Pulls the posting list out of a search response. Accepts both
/// `{"jobs": [...]}` and a bare array; anything else yields no postings.
pub(crate) fn postings_from_body(body: &Value) -> Vec<JobPosting> {
    let jobs = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("jobs") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    jobs.iter().map(JobPosting::from_raw).collect()
}
