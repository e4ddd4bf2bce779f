//! Similarity ranker: scores accepted postings against the résumé embedding.

use crate::embedding::{cosine_similarity, embed_skipping_blank, EmbeddingError, EmbeddingProvider};
use crate::jobs::matcher::MatchError;
use crate::jobs::posting::JobPosting;
use crate::jobs::sanitize::plain_text;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPosting {
    pub posting: JobPosting,
    pub similarity: f32,
}

/// Text embedded for a posting: its description without markup, or "" when
/// it has none.
pub fn embedding_text(posting: &JobPosting) -> String {
    plain_text(Some(&posting.description))
}

/// Embeds all descriptions in one batch, scores each against
/// `resume_embedding`, and returns the best `top_k`.
///
/// Postings with no description are not sent to the provider and score 0.0.
/// A provider that returns a different number of vectors than it was given
/// fails the whole pass.
pub async fn rank_postings(
    embedder: &dyn EmbeddingProvider,
    resume_embedding: &[f32],
    postings: Vec<JobPosting>,
    top_k: usize,
) -> Result<Vec<ScoredPosting>, MatchError> {
    if postings.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<String> = postings.iter().map(embedding_text).collect();
    let embeddings = match embed_skipping_blank(embedder, &texts).await {
        Ok(embeddings) => embeddings,
        Err(EmbeddingError::CountMismatch { expected, returned }) => {
            return Err(MatchError::ProviderFailure(format!(
                "embedding batch returned {returned} vectors for {expected} postings"
            )))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(select_top_k(resume_embedding, postings, &embeddings, top_k))
}

/// Sorts by descending similarity and keeps `top_k`. The sort is stable, so
/// equal scores keep their arrival order.
pub fn select_top_k(
    resume_embedding: &[f32],
    postings: Vec<JobPosting>,
    embeddings: &[Vec<f32>],
    top_k: usize,
) -> Vec<ScoredPosting> {
    let mut scored: Vec<ScoredPosting> = postings
        .into_iter()
        .zip(embeddings)
        .map(|(posting, embedding)| ScoredPosting {
            similarity: cosine_similarity(resume_embedding, embedding),
            posting,
        })
        .collect();

    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(top_k);
    scored
}
