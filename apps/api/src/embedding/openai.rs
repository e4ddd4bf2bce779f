//! OpenAI-compatible embeddings client (`POST {base_url}/embeddings`).
//!
//! Works against OpenAI itself and any server that mirrors its embeddings API
//! (local inference servers, proxies). The whole batch goes out in one request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EmbeddingConfig;
use crate::embedding::{non_blank_positions, splice_zero_vectors, EmbeddingError, EmbeddingProvider};

/// Only a rate-limited request is retried, once. Transport failures and
/// server errors surface on the first attempt.
const MAX_ATTEMPTS: u32 = 2;
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiEmbeddingProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    /// Blank inputs are never sent (the API rejects them); they come back as
    /// zero vectors at their original positions.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let positions = non_blank_positions(texts);
        if positions.is_empty() {
            return Ok(splice_zero_vectors(texts.len(), &positions, Vec::new()));
        }
        let inputs: Vec<String> = positions.iter().map(|&i| texts[i].clone()).collect();
        let vectors = self.request_embeddings(&inputs).await?;
        Ok(splice_zero_vectors(texts.len(), &positions, vectors))
    }
}

impl OpenAiEmbeddingProvider {
    async fn request_embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request_body = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await?;

            let status = response.status();

            if should_retry(status, attempt) {
                warn!(
                    "Embedding API rate limited, retrying after {}ms...",
                    RATE_LIMIT_BACKOFF.as_millis()
                );
                tokio::time::sleep(RATE_LIMIT_BACKOFF).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, body);
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let parsed: EmbeddingResponse = serde_json::from_str(&body)?;
            let vectors = into_ordered_vectors(parsed, inputs.len())?;

            debug!(
                "Embedding call succeeded: inputs={}, dimensions={}",
                vectors.len(),
                vectors.first().map(Vec::len).unwrap_or(0)
            );

            return Ok(vectors);
        }
    }
}

fn should_retry(status: StatusCode, attempt: u32) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_ATTEMPTS
}

/// Restores input order (the API tags each vector with its input index) and
/// enforces one vector per input.
fn into_ordered_vectors(
    mut response: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if response.data.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            returned: response.data.len(),
        });
    }
    response.data.sort_by_key(|entry| entry.index);
    Ok(response.data.into_iter().map(|d| d.embedding).collect())
}
