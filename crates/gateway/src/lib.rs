//! HTTP API gateway for HelpBot.
//!
//! Exposes the chat endpoint and a health check. Built on Axum.
//!
//! Request validation happens here, before orchestration runs; exhausted
//! model retries map to a 503 with a degraded-service reply. Everything
//! else the orchestrator absorbs internally.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use helpbot_agent::{Orchestrator, PromptAssembler};
use helpbot_config::AppConfig;
use helpbot_core::Embedder;
use helpbot_core::error::Error;
use helpbot_providers::{AnthropicProvider, RetryPolicy, RetryProvider};
use helpbot_retrieval::{HashEmbedder, KnowledgeIndex, Retriever};
use helpbot_sessions::SessionStore;

/// Reply returned when the model stays unreachable after bounded retries.
pub const DEGRADED_SERVICE_REPLY: &str =
    "We're having trouble answering right now. Please try again in a few minutes.";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: Arc<Orchestrator>,
}

type SharedState = Arc<GatewayState>;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Builds the provider, tool registry, retriever, and session store once
/// and shares them with every request task. The API key check has already
/// happened at startup (`AppConfig::require_api_key`).
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
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

    // A missing index file is a valid first-run state: serve with zero
    // context and let the grounding policy answer "not found".
    let index_path = std::path::Path::new(&config.retrieval.index_path);
    let index = if index_path.exists() {
        Arc::new(KnowledgeIndex::load(index_path)?)
    } else {
        warn!(path = %index_path.display(), "No knowledge index found, serving without context");
        Arc::new(KnowledgeIndex::new(embedder.dimension()))
    };

    let retriever = Arc::new(Retriever::new(embedder, index)?);
    let tools = Arc::new(helpbot_tools::support_registry());
    let sessions = Arc::new(SessionStore::new());

    let orchestrator = Arc::new(
        Orchestrator::new(
            provider,
            tools,
            retriever,
            sessions,
            PromptAssembler::new(
                &config.agent.model,
                config.agent.temperature,
                Some(config.agent.max_tokens),
            ),
        )
        .with_max_tool_rounds(config.agent.max_tool_rounds)
        .with_top_k(config.retrieval.top_k),
    );

    let state = Arc::new(GatewayState { orchestrator });
    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    if payload.session_id.trim().is_empty() {
        return Err(bad_request("session_id must not be empty"));
    }
    if payload.message.trim().is_empty() {
        return Err(bad_request("message must not be empty"));
    }

    info!(
        session_id = %payload.session_id,
        message_len = payload.message.len(),
        "Chat message received"
    );

    // The turn runs in its own task so a client disconnect cancels it via
    // the token (checked before each tool dispatch) instead of killing it
    // at an arbitrary await point.
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let orchestrator = state.orchestrator.clone();
    let turn = tokio::spawn(async move {
        orchestrator
            .handle_message(&payload.session_id, &payload.message, &cancel)
            .await
    });

    let outcome = turn.await.map_err(|e| {
        error!(error = %e, "Turn task panicked");
        internal_error("internal error")
    })?;
    drop(guard);

    match outcome {
        Ok(reply) => Ok(Json(ChatResponse { reply })),
        Err(Error::Provider(e)) => {
            error!(error = %e, "Model call failed after retries");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: DEGRADED_SERVICE_REPLY.into(),
                }),
            ))
        }
        Err(Error::Cancelled) => {
            // The client is gone; nobody reads this response.
            Err(internal_error("request cancelled"))
        }
        Err(e) => {
            error!(error = %e, "Turn failed");
            Err(internal_error("internal error"))
        }
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn internal_error(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
