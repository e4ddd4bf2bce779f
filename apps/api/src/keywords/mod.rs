//! Résumé keyword extraction.
//!
//! The job search only needs a set of lower-cased phrases; how they are
//! produced is behind `KeywordExtractor`. The default backend scores candidate
//! phrases by embedding similarity to the whole résumé.

use async_trait::async_trait;

use crate::embedding::EmbeddingError;

pub mod extractor;
mod stop_words;

pub use extractor::EmbeddingKeywordExtractor;

#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    /// Returns lower-cased, de-duplicated phrases in sorted order.
    async fn extract(&self, text: &str) -> Result<Vec<String>, EmbeddingError>;
}
