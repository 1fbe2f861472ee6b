//! `helpbot index` — the offline corpus-to-index batch job.
//!
//! Reads the raw knowledge base file, splits it into overlapping chunks,
//! embeds each chunk with the same embedder the retriever uses at serving
//! time, and persists the result as a JSON index.

use helpbot_config::AppConfig;
use helpbot_core::{Embedder, KnowledgeChunk};
use helpbot_retrieval::{HashEmbedder, KnowledgeIndex, chunk_text};
use std::path::PathBuf;
use tracing::{info, warn};

pub async fn run(
    config: AppConfig,
    input: PathBuf,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.unwrap_or_else(|| PathBuf::from(&config.retrieval.index_path));

    info!(input = %input.display(), "Reading knowledge base file");
    let full_text = std::fs::read_to_string(&input)
        .map_err(|e| format!("knowledge base file not found: {}: {e}", input.display()))?;

    info!("Splitting text into chunks");
    let chunks = chunk_text(
        &full_text,
        config.retrieval.chunk_size,
        config.retrieval.chunk_overlap,
    );
    if chunks.len() < 2 {
        warn!("Only {} chunk(s) produced. Consider adding more text.", chunks.len());
    }
    info!(count = chunks.len(), "Generated chunks");

    let embedder = HashEmbedder::with_dimension(config.retrieval.embedding_dimension);

    info!("Computing embeddings");
    let mut records = Vec::with_capacity(chunks.len());
    for (i, text) in chunks.into_iter().enumerate() {
        let embedding = embedder.embed(&text).await?;
        records.push(KnowledgeChunk {
            id: format!("doc_{i}"),
            text,
            embedding,
        });
    }

    let index = KnowledgeIndex::from_chunks(embedder.dimension(), records)?;
    index.save(&output)?;

    info!(output = %output.display(), "Success! Knowledge index written");
    Ok(())
}
