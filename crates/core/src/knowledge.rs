//! Knowledge corpus domain types.

use serde::{Deserialize, Serialize};

/// A single passage from the knowledge corpus with its precomputed
/// embedding. Immutable once built — created only by the offline indexing
/// job, read-only at serving time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Stable chunk identifier (e.g., "doc_17")
    pub id: String,

    /// The passage text
    pub text: String,

    /// Fixed-dimension embedding vector
    pub embedding: Vec<f32>,
}
