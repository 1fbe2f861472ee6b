//! Retriever — embed a query and return the top-k corpus passages.

use crate::index::KnowledgeIndex;
use helpbot_core::Embedder;
use helpbot_core::error::RetrievalError;
use std::sync::Arc;
use tracing::debug;

/// A passage returned by retrieval, with its similarity score.
#[derive(Debug, Clone)]
pub struct RetrievedPassage {
    pub text: String,
    pub score: f32,
}

/// Embeds queries with the same embedder the index was built with and
/// searches the index. An empty result set is not an error — grounding
/// policy in the prompt handles the zero-context case.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<KnowledgeIndex>,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("dimension", &self.index.dimension())
            .finish()
    }
}

impl Retriever {
    /// Create a retriever, rejecting an embedder whose dimension does not
    /// match the index.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<KnowledgeIndex>,
    ) -> std::result::Result<Self, RetrievalError> {
        if embedder.dimension() != index.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: index.dimension(),
                actual: embedder.dimension(),
            });
        }
        Ok(Self { embedder, index })
    }

    /// Retrieve at most `k` passages for a query, ordered by descending
    /// similarity. No score threshold is enforced by design.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> std::result::Result<Vec<RetrievedPassage>, RetrievalError> {
        if self.index.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let hits = self.index.similarity_search(&query_embedding, k)?;

        debug!(query_len = query.len(), hits = hits.len(), "Retrieved passages");

        Ok(hits
            .into_iter()
            .map(|(chunk, score)| RetrievedPassage {
                text: chunk.text.clone(),
                score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;
    use helpbot_core::KnowledgeChunk;

    async fn build_index(embedder: &HashEmbedder, texts: &[&str]) -> KnowledgeIndex {
        let mut chunks = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let embedding = helpbot_core::Embedder::embed(embedder, text).await.unwrap();
            chunks.push(KnowledgeChunk {
                id: format!("doc_{i}"),
                text: text.to_string(),
                embedding,
            });
        }
        KnowledgeIndex::from_chunks(embedder.dimension(), chunks).unwrap()
    }

    #[tokio::test]
    async fn retrieval_is_deterministic_and_order_stable() {
        let embedder = HashEmbedder::new();
        let index = build_index(
            &embedder,
            &[
                "Standard shipping takes 5-7 business days.",
                "Returns are accepted within 30 days of delivery.",
                "We accept all major credit cards and PayPal.",
            ],
        )
        .await;

        let retriever =
            Retriever::new(Arc::new(HashEmbedder::new()), Arc::new(index)).unwrap();

        let first = retriever.retrieve("standard shipping time", 2).await.unwrap();
        let second = retriever.retrieve("standard shipping time", 2).await.unwrap();

        assert_eq!(first.len(), 2);
        let texts_a: Vec<&str> = first.iter().map(|p| p.text.as_str()).collect();
        let texts_b: Vec<&str> = second.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts_a, texts_b);
    }

    #[tokio::test]
    async fn relevant_passage_ranks_first() {
        let embedder = HashEmbedder::new();
        let index = build_index(
            &embedder,
            &[
                "Returns are accepted within 30 days of delivery.",
                "Standard shipping takes 5-7 business days.",
            ],
        )
        .await;

        let retriever =
            Retriever::new(Arc::new(HashEmbedder::new()), Arc::new(index)).unwrap();
        let hits = retriever
            .retrieve("What is the standard shipping time?", 1)
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert!(hits[0].text.contains("Standard shipping"));
    }

    #[tokio::test]
    async fn empty_index_returns_empty_not_error() {
        let embedder = Arc::new(HashEmbedder::new());
        let index = Arc::new(KnowledgeIndex::new(embedder.dimension()));
        let retriever = Retriever::new(embedder, index).unwrap();

        let hits = retriever.retrieve("anything", 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn mismatched_embedder_rejected_at_construction() {
        let embedder = Arc::new(HashEmbedder::with_dimension(64));
        let index = Arc::new(KnowledgeIndex::new(256));
        let err = Retriever::new(embedder, index).unwrap_err();
        assert!(matches!(err, RetrievalError::DimensionMismatch { .. }));
    }
}
