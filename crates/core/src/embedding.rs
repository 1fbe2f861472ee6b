//! Embedder trait — the single shared embedding seam.
//!
//! The offline index build and the online retriever MUST embed through the
//! same implementation: mismatched embedding functions silently degrade
//! recall, so the call-site is unified behind this trait and both sides
//! are handed the same instance.

use crate::error::RetrievalError;
use async_trait::async_trait;

/// Produces fixed-dimension embedding vectors for text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// A human-readable name for this embedder (e.g., "feature-hash").
    fn name(&self) -> &str;

    /// The dimensionality of produced vectors. Constant for the lifetime
    /// of the embedder; persisted alongside the index and checked on load.
    fn dimension(&self) -> usize;

    /// Embed a single piece of text.
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, RetrievalError>;
}
