//! `helpbot ask` — one-shot local question, no HTTP layer.

use helpbot_agent::{Orchestrator, PromptAssembler};
use helpbot_config::AppConfig;
use helpbot_core::Embedder;
use helpbot_providers::{AnthropicProvider, RetryPolicy, RetryProvider};
use helpbot_retrieval::{HashEmbedder, KnowledgeIndex, Retriever};
use helpbot_sessions::SessionStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub async fn run(
    config: AppConfig,
    session_id: &str,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = config.require_api_key()?;

    let provider = Arc::new(RetryProvider::new(
        Arc::new(AnthropicProvider::new(api_key)),
        RetryPolicy {
            max_retries: config.agent.retry.max_retries,
            initial_backoff: std::time::Duration::from_millis(config.agent.retry.initial_backoff_ms),
        },
    ));

    let embedder = Arc::new(HashEmbedder::with_dimension(
        config.retrieval.embedding_dimension,
    ));
    let index_path = std::path::Path::new(&config.retrieval.index_path);
    let index = if index_path.exists() {
        Arc::new(KnowledgeIndex::load(index_path)?)
    } else {
        warn!(path = %index_path.display(), "No knowledge index found, asking without context");
        Arc::new(KnowledgeIndex::new(embedder.dimension()))
    };
    let retriever = Arc::new(Retriever::new(embedder, index)?);

    let orchestrator = Orchestrator::new(
        provider,
        Arc::new(helpbot_tools::support_registry()),
        retriever,
        Arc::new(SessionStore::new()),
        PromptAssembler::new(
            &config.agent.model,
            config.agent.temperature,
            Some(config.agent.max_tokens),
        ),
    )
    .with_max_tool_rounds(config.agent.max_tool_rounds)
    .with_top_k(config.retrieval.top_k);

    let reply = orchestrator
        .handle_message(session_id, message, &CancellationToken::new())
        .await?;

    println!("{reply}");
    Ok(())
}
