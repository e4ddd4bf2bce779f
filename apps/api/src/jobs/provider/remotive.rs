//! Remotive public job board (`GET {base}/remote-jobs?search=...`). No auth.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::jobs::posting::JobPosting;
use crate::jobs::provider::{postings_from_body, JobSearchProvider, ProviderError};

#[derive(Clone)]
pub struct RemotiveProvider {
    client: Client,
    endpoint: String,
}

impl RemotiveProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: format!("{}/remote-jobs", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl JobSearchProvider for RemotiveProvider {
    fn name(&self) -> &'static str {
        "remotive"
    }

    async fn search(&self, query: &str) -> Result<Vec<JobPosting>, ProviderError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("search", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: Value = serde_json::from_str(&response.text().await?)?;
        let postings = postings_from_body(&body);
        debug!("remotive: '{}' returned {} postings", query, postings.len());
        Ok(postings)
    }
}
