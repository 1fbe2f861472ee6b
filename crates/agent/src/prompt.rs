//! System prompt construction and model request assembly.
//!
//! The prompt defines the agent persona, the grounding rules, and how
//! retrieved context and chat history are used. Assembly is deterministic
//! given identical inputs — no randomness, no side effects.

use helpbot_core::message::Message;
use helpbot_core::provider::{ProviderRequest, ToolDefinition};
use helpbot_retrieval::RetrievedPassage;

const PERSONA_AND_RULES: &str = "\
You are **HelpBot**, a concise and friendly e-commerce customer support agent.

Capabilities:
- Answer user questions about orders, returns, shipping, and payments.
- Use the retrieved knowledge base context below when relevant.
- May call tools (get_order_status, send_email) when they help answer the query.

Grounding Rules:
1. Answer only from the *Retrieved Context* section or from tool results. If the
   answer is directly present there, summarize it in your own words.
2. If the user requests an action that maps to a tool, call the appropriate tool.
3. If context is empty or does not contain the answer, say clearly that the
   information was not found. Do not answer from general knowledge.
4. Before calling a tool, ensure required parameters are present. If missing,
   ask the user to provide them instead of calling the tool.
5. After receiving tool output, incorporate it into a natural language reply.

Respond helpfully. If clarification is needed, ask a follow-up question.
Do **not** invent order IDs or email addresses.";

const NO_CONTEXT_MARKER: &str = "NO CONTEXT RETRIEVED";

/// Builds model requests from the fixed instruction block, retrieved
/// passages, session history, and the declared tool schemas.
pub struct PromptAssembler {
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl PromptAssembler {
    pub fn new(model: impl Into<String>, temperature: f32, max_tokens: Option<u32>) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    /// Format retrieved passages into a labelled context block.
    fn context_block(passages: &[RetrievedPassage]) -> String {
        if passages.is_empty() {
            return NO_CONTEXT_MARKER.to_string();
        }
        passages
            .iter()
            .enumerate()
            .map(|(i, p)| format!("[Document {} | score={:.4}]\n{}", i + 1, p.score, p.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The full system instruction block for one turn.
    pub fn system_prompt(&self, passages: &[RetrievedPassage]) -> String {
        format!(
            "{PERSONA_AND_RULES}\n\nRetrieved Context:\n------------------\n{}",
            Self::context_block(passages)
        )
    }

    /// Compose a model-ready request: system instructions first, then the
    /// prior history, then the messages of the in-progress turn.
    pub fn build(
        &self,
        passages: &[RetrievedPassage],
        history: &[Message],
        turn: &[Message],
        tools: &[ToolDefinition],
    ) -> ProviderRequest {
        let mut messages = Vec::with_capacity(1 + history.len() + turn.len());
        messages.push(Message::system(self.system_prompt(passages)));
        messages.extend_from_slice(history);
        messages.extend_from_slice(turn);

        ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: tools.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpbot_core::message::Role;

    fn passage(text: &str, score: f32) -> RetrievedPassage {
        RetrievedPassage {
            text: text.into(),
            score,
        }
    }

    fn assembler() -> PromptAssembler {
        PromptAssembler::new("mock-model", 0.2, Some(500))
    }

    #[test]
    fn system_prompt_includes_persona_and_context() {
        let prompt = assembler().system_prompt(&[passage("Shipping takes 5-7 days.", 0.91)]);
        assert!(prompt.contains("HelpBot"));
        assert!(prompt.contains("Retrieved Context"));
        assert!(prompt.contains("[Document 1 | score=0.9100]"));
        assert!(prompt.contains("Shipping takes 5-7 days."));
    }

    #[test]
    fn empty_passages_marked_explicitly() {
        let prompt = assembler().system_prompt(&[]);
        assert!(prompt.contains("NO CONTEXT RETRIEVED"));
    }

    #[test]
    fn build_orders_system_history_turn() {
        let history = vec![Message::user("earlier question"), Message::assistant("earlier answer")];
        let turn = vec![Message::user("current question")];
        let request = assembler().build(&[], &history, &turn, &[]);

        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].content, "earlier question");
        assert_eq!(request.messages[2].content, "earlier answer");
        assert_eq!(request.messages[3].content, "current question");
        assert_eq!(request.model, "mock-model");
        assert_eq!(request.max_tokens, Some(500));
    }

    #[test]
    fn build_is_deterministic() {
        let passages = vec![passage("Returns within 30 days.", 0.8)];
        let history = vec![Message::user("hi")];
        let turn = vec![Message::user("can I return this?")];
        let tools = vec![];

        let a = assembler().build(&passages, &history, &turn, &tools);
        let b = assembler().build(&passages, &history, &turn, &tools);

        assert_eq!(a.messages[0].content, b.messages[0].content);
        assert_eq!(a.messages.len(), b.messages.len());
    }

    #[test]
    fn tool_definitions_pass_through() {
        let tools = vec![ToolDefinition {
            name: "get_order_status".into(),
            description: "lookup".into(),
            parameters: serde_json::json!({"type": "object"}),
        }];
        let request = assembler().build(&[], &[], &[Message::user("q")], &tools);
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.tools[0].name, "get_order_status");
    }
}
