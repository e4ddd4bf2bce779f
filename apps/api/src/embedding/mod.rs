//! Embedding provider: turns text into fixed-dimension vectors.
//!
//! Built once at startup and shared through `AppState`. Everything that needs
//! vectors (résumé upload, keyword extraction, job ranking) goes through the
//! `EmbeddingProvider` trait so the backend can be swapped without touching callers.

use async_trait::async_trait;
use thiserror::Error;

pub mod openai;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider returned {returned} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, returned: usize },

    #[error("Provider returned no embeddings")]
    EmptyResponse,
}

/// Text → vector provider.
///
/// `embed_batch` must return exactly one vector per input, in input order.
/// Callers rely on positional zipping.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Convenience for a single input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or(EmbeddingError::EmptyResponse)
    }
}

/// Indices of inputs that contain more than whitespace.
pub fn non_blank_positions(texts: &[String]) -> Vec<usize> {
    texts
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.trim().is_empty())
        .map(|(i, _)| i)
        .collect()
}

/// Rebuilds a full-length batch from the vectors of the non-blank inputs.
/// Blank positions get a zero vector of the same dimension, which scores
/// exactly 0.0 against anything.
pub fn splice_zero_vectors(
    total: usize,
    positions: &[usize],
    vectors: Vec<Vec<f32>>,
) -> Vec<Vec<f32>> {
    let dimension = vectors.first().map(Vec::len).unwrap_or(0);
    let mut out = vec![vec![0.0; dimension]; total];
    for (&i, vector) in positions.iter().zip(vectors) {
        out[i] = vector;
    }
    out
}

/// Embeds `texts`, sending only the non-blank ones to `embedder`.
///
/// A provider that returns the wrong number of vectors for the inputs it was
/// sent is reported as `CountMismatch`.
pub async fn embed_skipping_blank(
    embedder: &dyn EmbeddingProvider,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let positions = non_blank_positions(texts);
    if positions.is_empty() {
        return Ok(splice_zero_vectors(texts.len(), &positions, Vec::new()));
    }
    let inputs: Vec<String> = positions.iter().map(|&i| texts[i].clone()).collect();
    let vectors = embedder.embed_batch(&inputs).await?;
    if vectors.len() != inputs.len() {
        return Err(EmbeddingError::CountMismatch {
            expected: inputs.len(),
            returned: vectors.len(),
        });
    }
    Ok(splice_zero_vectors(texts.len(), &positions, vectors))
}

/// Cosine similarity between two vectors.
///
/// Returns exactly 0.0 when either vector is all zeros or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}
