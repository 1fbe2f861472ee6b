//! The conversation orchestrator state machine.
//!
//! One turn walks `AwaitingModel -> (ToolRound)* -> Done`. After each model
//! call: tool calls present means dispatch them all and re-enter
//! `AwaitingModel` with the enlarged context; a plain text reply means
//! `Done`. A hard round cap bounds the loop. The turn's messages are
//! buffered and appended to the session only on completion: a failed model
//! call appends nothing, a capped turn appends its attempted rounds plus a
//! degraded final reply.

use helpbot_core::error::Error;
use helpbot_core::message::{Message, MessageToolCall};
use helpbot_core::provider::Provider;
use helpbot_core::tool::{ToolCall, ToolRegistry};
use helpbot_retrieval::{RetrievedPassage, Retriever};
use helpbot_sessions::SessionStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::prompt::PromptAssembler;

/// Default maximum tool-invocation rounds per turn.
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 5;

/// Default number of passages retrieved per turn.
pub const DEFAULT_TOP_K: usize = 3;

/// Final reply when a turn exceeds the round cap.
pub const ROUND_CAP_REPLY: &str =
    "I wasn't able to complete that request. Please try rephrasing it or breaking it into smaller steps.";

/// Where the state machine stands within one turn.
enum TurnPhase {
    /// Waiting on the next model response.
    AwaitingModel,
    /// The model requested tools; the assistant message carrying the calls
    /// has not been executed yet.
    ToolRound(Message),
    /// Terminal: the reply to return to the caller.
    Done(String),
}

/// Drives the per-message conversation loop over the injected
/// collaborators. All dispatch-level and retrieval-level conditions are
/// absorbed here; only exhausted model retries escalate to the transport
/// boundary.
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    retriever: Arc<Retriever>,
    sessions: Arc<SessionStore>,
    assembler: PromptAssembler,
    max_tool_rounds: u32,
    top_k: usize,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        retriever: Arc<Retriever>,
        sessions: Arc<SessionStore>,
        assembler: PromptAssembler,
    ) -> Self {
        Self {
            provider,
            tools,
            retriever,
            sessions,
            assembler,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the maximum number of tool rounds per turn.
    pub fn with_max_tool_rounds(mut self, max: u32) -> Self {
        self.max_tool_rounds = max;
        self
    }

    /// Set how many passages are retrieved per turn.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Process one inbound user message and return the final reply.
    ///
    /// The session is locked for the whole read-modify-append cycle, so
    /// concurrent turns on the same id serialize; turns on different ids
    /// proceed independently. `cancel` is checked before every dispatcher
    /// invocation so a disconnected client triggers no further tool side
    /// effects.
    pub async fn handle_message(
        &self,
        session_id: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<String, Error> {
        let handle = self.sessions.handle(session_id);
        let mut session = handle.lock().await;

        info!(
            session_id,
            history_len = session.messages.len(),
            "Processing turn"
        );

        // Retrieval failures are absorbed: a broken index degrades to the
        // zero-context prompt path rather than failing the turn.
        let passages: Vec<RetrievedPassage> =
            match self.retriever.retrieve(text, self.top_k).await {
                Ok(passages) => passages,
                Err(e) => {
                    warn!(session_id, error = %e, "Retrieval failed, continuing without context");
                    Vec::new()
                }
            };

        let tool_definitions = self.tools.definitions();

        // Messages of the in-progress turn; appended to the session only
        // once the turn completes.
        let mut turn: Vec<Message> = vec![Message::user(text)];
        let mut rounds_done = 0u32;
        let mut phase = TurnPhase::AwaitingModel;

        let reply = loop {
            match phase {
                TurnPhase::AwaitingModel => {
                    let request = self.assembler.build(
                        &passages,
                        &session.messages,
                        &turn,
                        &tool_definitions,
                    );

                    // A failed model call (after the provider's bounded
                    // retries) aborts the turn; the buffered messages are
                    // dropped so the session records all of it or none.
                    let response = self.provider.complete(request).await?;

                    phase = if response.message.tool_calls.is_empty() {
                        let text = response.message.content.clone();
                        turn.push(response.message);
                        TurnPhase::Done(text)
                    } else {
                        TurnPhase::ToolRound(response.message)
                    };
                }

                TurnPhase::ToolRound(assistant_message) => {
                    if rounds_done >= self.max_tool_rounds {
                        warn!(
                            session_id,
                            rounds = rounds_done,
                            "Round cap exceeded, terminating turn"
                        );
                        // The unexecuted tool-call message is discarded so
                        // the recorded history never contains a ToolCall
                        // without its results.
                        turn.push(Message::assistant(ROUND_CAP_REPLY));
                        phase = TurnPhase::Done(ROUND_CAP_REPLY.to_string());
                        continue;
                    }

                    let calls = assistant_message.tool_calls.clone();
                    debug!(
                        session_id,
                        round = rounds_done + 1,
                        tool_count = calls.len(),
                        "Executing tool round"
                    );
                    turn.push(assistant_message);

                    for tc in &calls {
                        if cancel.is_cancelled() {
                            info!(session_id, "Client disconnected, abandoning turn before dispatch");
                            return Err(Error::Cancelled);
                        }
                        let result = self.tools.dispatch(&to_tool_call(tc)).await;
                        turn.push(Message::tool_result(&result.call_id, &result.output));
                    }

                    rounds_done += 1;
                    phase = TurnPhase::AwaitingModel;
                }

                TurnPhase::Done(reply) => break reply,
            }
        };

        for message in turn {
            session.push(message);
        }

        info!(
            session_id,
            rounds = rounds_done,
            reply_len = reply.len(),
            "Turn complete"
        );
        Ok(reply)
    }
}

fn to_tool_call(tc: &MessageToolCall) -> ToolCall {
    ToolCall {
        id: tc.id.clone(),
        name: tc.name.clone(),
        arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
    }
}
