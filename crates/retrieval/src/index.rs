//! Knowledge index — immutable chunk collection with cosine top-k search.
//!
//! Built once by the offline indexing job, persisted as JSON, loaded
//! read-only at serving time. The declared embedding dimension travels
//! with the file and is validated on load and on every query, so an
//! embedder/index mismatch surfaces as an error instead of silently
//! degraded recall.

use helpbot_core::KnowledgeChunk;
use helpbot_core::error::RetrievalError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// The serving-time knowledge index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeIndex {
    dimension: usize,
    chunks: Vec<KnowledgeChunk>,
}

impl KnowledgeIndex {
    /// Create an empty index with a declared dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            chunks: Vec::new(),
        }
    }

    /// Build an index from pre-embedded chunks, validating every vector
    /// against the declared dimension.
    pub fn from_chunks(
        dimension: usize,
        chunks: Vec<KnowledgeChunk>,
    ) -> std::result::Result<Self, RetrievalError> {
        for chunk in &chunks {
            if chunk.embedding.len() != dimension {
                return Err(RetrievalError::DimensionMismatch {
                    expected: dimension,
                    actual: chunk.embedding.len(),
                });
            }
        }
        Ok(Self { dimension, chunks })
    }

    /// The declared embedding dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Top-k cosine similarity search.
    ///
    /// Returns at most `k` chunks ordered by descending similarity; equal
    /// scores keep their original insertion order so repeated queries over
    /// a fixed corpus are fully deterministic.
    pub fn similarity_search(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> std::result::Result<Vec<(&KnowledgeChunk, f32)>, RetrievalError> {
        if query_embedding.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: query_embedding.len(),
            });
        }

        let mut scored: Vec<(&KnowledgeChunk, f32)> = self
            .chunks
            .iter()
            .map(|chunk| (chunk, cosine_similarity(&chunk.embedding, query_embedding)))
            .collect();

        // Stable sort keeps insertion order among ties.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Persist the index as JSON.
    pub fn save(&self, path: &Path) -> std::result::Result<(), RetrievalError> {
        let json = serde_json::to_string(self)
            .map_err(|e| RetrievalError::Storage(format!("serialize index: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| RetrievalError::Storage(format!("write {}: {e}", path.display())))?;
        info!(path = %path.display(), chunks = self.chunks.len(), "Knowledge index written");
        Ok(())
    }

    /// Load a persisted index, re-validating every stored vector against
    /// the declared dimension.
    pub fn load(path: &Path) -> std::result::Result<Self, RetrievalError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| RetrievalError::Storage(format!("read {}: {e}", path.display())))?;
        let index: Self = serde_json::from_str(&json)
            .map_err(|e| RetrievalError::Storage(format!("parse {}: {e}", path.display())))?;
        Self::from_chunks(index.dimension, index.chunks)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}
