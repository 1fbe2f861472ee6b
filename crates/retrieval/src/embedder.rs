//! Deterministic feature-hashing embedder.
//!
//! Tokenizes on non-alphanumeric boundaries, hashes each lowercased token
//! into a fixed number of buckets (FNV-1a, with a signed projection to
//! reduce collision bias), and L2-normalises the result. No model weights,
//! no network: the same text always produces the same vector, which keeps
//! index and query embeddings in one space and makes retrieval testable.

use async_trait::async_trait;
use helpbot_core::Embedder;
use helpbot_core::error::RetrievalError;

/// Default embedding dimensionality.
pub const DEFAULT_DIMENSION: usize = 256;

/// Feature-hashing bag-of-words embedder.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder with the default dimension.
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_DIMENSION)
    }

    /// Create an embedder with a custom dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        assert!(dimension > 0, "embedding dimension must be positive");
        Self { dimension }
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            // High bits pick the sign so colliding tokens can cancel
            // instead of always reinforcing.
            let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        l2_normalize(&mut vector);
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "feature-hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, RetrievalError> {
        Ok(self.embed_sync(text))
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

fn l2_normalize(vector: &mut [f32]) {
    let norm: f64 = vector.iter().map(|x| (*x as f64) * (*x as f64)).sum();
    let norm = norm.sqrt();
    if norm > 1e-10 {
        for x in vector.iter_mut() {
            *x = (*x as f64 / norm) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedding_is_deterministic() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("Where is my order?").await.unwrap();
        let b = embedder.embed("Where is my order?").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn embedding_has_declared_dimension() {
        let embedder = HashEmbedder::with_dimension(64);
        let v = embedder.embed("shipping times").await.unwrap();
        assert_eq!(v.len(), 64);
        assert_eq!(embedder.dimension(), 64);
    }

    #[tokio::test]
    async fn embedding_is_normalized() {
        let embedder = HashEmbedder::new();
        let v = embedder.embed("returns and refunds policy").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new();
        let v = embedder.embed("").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn tokenization_is_case_insensitive() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("SHIPPING policy").await.unwrap();
        let b = embedder.embed("shipping POLICY").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn related_text_scores_higher_than_unrelated() {
        let embedder = HashEmbedder::new();
        let doc = embedder
            .embed("Standard shipping takes 5-7 business days.")
            .await
            .unwrap();
        let near = embedder
            .embed("What is the standard shipping time?")
            .await
            .unwrap();
        let far = embedder.embed("Do you sell furniture?").await.unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&doc, &near) > dot(&doc, &far));
    }
}
