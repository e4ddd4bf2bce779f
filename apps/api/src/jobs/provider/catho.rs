//! Catho job board. OAuth2 client-credentials token from `{base}/oauth/token`,
//! then `GET {base}/jobs?keywords=a,b` with a bearer token.
//!
//! The token is cached until shortly before it expires so a batch of
//! concurrent queries shares one token request.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::jobs::posting::JobPosting;
use crate::jobs::provider::{postings_from_body, JobSearchProvider, ProviderError};

/// Used when the token response carries no `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(300);
/// Refresh this long before the advertised expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct CathoProvider {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl CathoProvider {
    pub fn new(
        base_url: &str,
        client_id: String,
        client_secret: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .client
            .post(format!("{}/oauth/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(format!("status {status}: {body}")));
        }

        let parsed: TokenResponse = serde_json::from_str(&response.text().await?)?;
        let value = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::Auth("token response has no access_token".to_string()))?;

        let lifetime = parsed
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME)
            .saturating_sub(TOKEN_EXPIRY_MARGIN);

        info!("catho: obtained access token (valid {}s)", lifetime.as_secs());
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(value)
    }
}

/// Catho takes comma-separated keywords rather than free text.
fn keywords_param(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(",")
}

#[async_trait]
impl JobSearchProvider for CathoProvider {
    fn name(&self) -> &'static str {
        "catho"
    }

    async fn search(&self, query: &str) -> Result<Vec<JobPosting>, ProviderError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(format!("{}/jobs", self.base_url))
            .bearer_auth(&token)
            .query(&[("keywords", keywords_param(query))])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            // Token revoked or expired early; next call fetches a new one.
            *self.token.lock().await = None;
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: Value = serde_json::from_str(&response.text().await?)?;
        let postings = postings_from_body(&body);
        debug!("catho: '{}' returned {} postings", query, postings.len());
        Ok(postings)
    }
}
