//! Embedding-based keyword extractor.
//!
//! Algorithm:
//! 1. Candidate phrases: 1- and 2-word n-grams over the lower-cased résumé
//!    tokens that remain after stop-word removal
//! 2. Embed the résumé and every candidate
//! 3. Keep the `candidates` phrases closest to the résumé
//! 4. Pick `top_n` of them with Maximal Marginal Relevance, trading relevance
//!    to the résumé against similarity to phrases already picked (`diversity`)

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::KeywordConfig;
use crate::embedding::{cosine_similarity, EmbeddingError, EmbeddingProvider};
use crate::keywords::stop_words::is_stop_word;
use crate::keywords::KeywordExtractor;

/// Inputs per embedding request when scoring candidates.
const EMBED_BATCH_SIZE: usize = 256;

pub struct EmbeddingKeywordExtractor {
    embedder: Arc<dyn EmbeddingProvider>,
    config: KeywordConfig,
}

impl EmbeddingKeywordExtractor {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: KeywordConfig) -> Self {
        Self { embedder, config }
    }

    async fn embed_all(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(inputs.len());
        for chunk in inputs.chunks(EMBED_BATCH_SIZE) {
            let batch = self.embedder.embed_batch(chunk).await?;
            if batch.len() != chunk.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: chunk.len(),
                    returned: batch.len(),
                });
            }
            vectors.extend(batch);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl KeywordExtractor for EmbeddingKeywordExtractor {
    async fn extract(&self, text: &str) -> Result<Vec<String>, EmbeddingError> {
        let candidates = candidate_phrases(text);
        if candidates.is_empty() || self.config.top_n == 0 {
            return Ok(Vec::new());
        }

        let mut inputs = Vec::with_capacity(candidates.len() + 1);
        inputs.push(text.to_string());
        inputs.extend(candidates.iter().cloned());

        let vectors = self.embed_all(&inputs).await?;
        let (document, phrase_vectors) =
            vectors.split_first().ok_or(EmbeddingError::EmptyResponse)?;

        let picked = select_mmr(
            document,
            phrase_vectors,
            self.config.top_n,
            self.config.candidates,
            self.config.diversity,
        );

        let keywords: BTreeSet<String> = picked
            .into_iter()
            .map(|i| candidates[i].to_lowercase())
            .collect();
        Ok(keywords.into_iter().collect())
    }
}

/// Unigrams and bigrams over non-stop-word tokens, first occurrence order.
pub fn candidate_phrases(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| t.chars().count() >= 2 && !is_stop_word(t))
        .collect();

    let mut seen = HashSet::new();
    let mut phrases = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        let unigram = token.to_string();
        if seen.insert(unigram.clone()) {
            phrases.push(unigram);
        }
        if let Some(next) = tokens.get(i + 1) {
            let bigram = format!("{token} {next}");
            if seen.insert(bigram.clone()) {
                phrases.push(bigram);
            }
        }
    }
    phrases
}

/// Maximal Marginal Relevance over the `pool` candidates most similar to the
/// document. Returns indices into `candidates`, in pick order.
pub fn select_mmr(
    document: &[f32],
    candidates: &[Vec<f32>],
    top_n: usize,
    pool: usize,
    diversity: f32,
) -> Vec<usize> {
    let mut ranked: Vec<(usize, f32)> = candidates
        .iter()
        .enumerate()
        .map(|(i, v)| (i, cosine_similarity(document, v)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(pool.max(1));

    let mut selected: Vec<usize> = Vec::new();
    let mut remaining: Vec<(usize, f32)> = ranked;

    while selected.len() < top_n && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (pos, (idx, relevance)) in remaining.iter().enumerate() {
            let redundancy = selected
                .iter()
                .map(|&s| cosine_similarity(&candidates[*idx], &candidates[s]))
                .fold(0.0_f32, f32::max);
            let score = (1.0 - diversity) * relevance - diversity * redundancy;
            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }
        let (idx, _) = remaining.remove(best_pos);
        selected.push(idx);
    }

    selected
}
