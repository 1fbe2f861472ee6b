//! Tool trait, registry, and fail-closed dispatch.
//!
//! Tools are the agent's side-effecting capabilities (order lookup, email
//! dispatch). The registry holds the declared tool schemas and routes
//! model-issued tool calls to their handlers, validating arguments against
//! each schema centrally — a handler never sees arguments that failed
//! validation.

use crate::error::ToolError;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// A request to execute a tool, as emitted by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_use id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// The result of a tool dispatch.
///
/// Dispatch never fails at the type level: unknown tools, schema
/// violations, and handler errors are all encoded here so they can be fed
/// back to the model as a tool-role message and the conversation can
/// self-correct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content (JSON text on success, error payload otherwise)
    pub output: String,
}

/// The core Tool trait.
///
/// Each tool implements this trait and is registered in the ToolRegistry
/// at process start. Handlers are pure request/response: no retries, no
/// visible side effects beyond their declared purpose.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "get_order_status").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with already-validated arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Validate tool-call arguments against a declared JSON schema.
///
/// Covers the subset of JSON Schema the registry declares: a top-level
/// object with typed `properties` and a `required` list. Extra arguments
/// are tolerated; missing required parameters and type mismatches are not.
pub fn validate_arguments(
    schema: &serde_json::Value,
    arguments: &serde_json::Value,
) -> std::result::Result<(), String> {
    let Some(args) = arguments.as_object() else {
        return Err("arguments must be a JSON object".into());
    };

    let required = schema["required"].as_array().cloned().unwrap_or_default();
    for name in required.iter().filter_map(|v| v.as_str()) {
        if !args.contains_key(name) {
            return Err(format!("missing required parameter '{name}'"));
        }
    }

    let Some(properties) = schema["properties"].as_object() else {
        return Ok(());
    };

    for (name, value) in args {
        let Some(declared) = properties.get(name) else {
            continue; // undeclared extras are ignored, not rejected
        };
        let Some(expected) = declared["type"].as_str() else {
            continue;
        };
        if !value_matches_type(value, expected) {
            return Err(format!(
                "parameter '{name}' must be of type {expected}, got {}",
                json_type_name(value)
            ));
        }
    }

    Ok(())
}

fn value_matches_type(value: &serde_json::Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// A registry of available tools.
///
/// The orchestrator uses this to:
/// 1. Get tool definitions to send to the LLM
/// 2. Dispatch tool calls when the LLM requests them
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Dispatch a tool call, failing closed.
    ///
    /// Unknown names and schema violations are intercepted here and never
    /// reach a handler. Every outcome — including handler errors — comes
    /// back as a `ToolResult` keyed to the originating call id.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "Dispatch rejected: unknown tool");
            return ToolResult {
                call_id: call.id.clone(),
                success: false,
                output: error_payload("unknown_tool", &format!("no tool named '{}'", call.name)),
            };
        };

        if let Err(reason) = validate_arguments(&tool.parameters_schema(), &call.arguments) {
            warn!(tool = %call.name, %reason, "Dispatch rejected: schema violation");
            return ToolResult {
                call_id: call.id.clone(),
                success: false,
                output: error_payload("schema_violation", &reason),
            };
        }

        match tool.execute(call.arguments.clone()).await {
            Ok(mut result) => {
                result.call_id = call.id.clone();
                result
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                ToolResult {
                    call_id: call.id.clone(),
                    success: false,
                    output: error_payload("tool_failed", &e.to_string()),
                }
            }
        }
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn error_payload(kind: &str, message: &str) -> String {
    serde_json::json!({ "error": kind, "message": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A test tool that counts how many times its handler actually runs.
    struct CountingTool {
        invocations: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            "counting"
        }
        fn description(&self) -> &str {
            "Counts handler invocations"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" },
                    "limit": { "type": "integer" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<ToolResult, ToolError> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: arguments["text"].as_str().unwrap_or("").to_string(),
            })
        }
    }

    fn registry_with_counter() -> (ToolRegistry, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(CountingTool {
            invocations: invocations.clone(),
        }));
        (registry, invocations)
    }

    #[test]
    fn registry_register_and_lookup() {
        let (registry, _) = registry_with_counter();
        assert!(registry.get("counting").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_definitions() {
        let (registry, _) = registry_with_counter();
        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "counting");
    }

    #[tokio::test]
    async fn dispatch_executes_valid_call() {
        let (registry, invocations) = registry_with_counter();
        let call = ToolCall {
            id: "call_1".into(),
            name: "counting".into(),
            arguments: serde_json::json!({"text": "hello"}),
        };
        let result = registry.dispatch(&call).await;
        assert!(result.success);
        assert_eq!(result.output, "hello");
        assert_eq!(result.call_id, "call_1");
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_tool_fails_closed() {
        let (registry, invocations) = registry_with_counter();
        let call = ToolCall {
            id: "call_1".into(),
            name: "nonexistent".into(),
            arguments: serde_json::json!({}),
        };
        let result = registry.dispatch(&call).await;
        assert!(!result.success);
        assert!(result.output.contains("unknown_tool"));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_required_parameter_never_reaches_handler() {
        let (registry, invocations) = registry_with_counter();
        let call = ToolCall {
            id: "call_1".into(),
            name: "counting".into(),
            arguments: serde_json::json!({"limit": 3}),
        };
        let result = registry.dispatch(&call).await;
        assert!(!result.success);
        assert!(result.output.contains("schema_violation"));
        assert!(result.output.contains("text"));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn type_mismatch_never_reaches_handler() {
        let (registry, invocations) = registry_with_counter();
        let call = ToolCall {
            id: "call_1".into(),
            name: "counting".into(),
            arguments: serde_json::json!({"text": "ok", "limit": "three"}),
        };
        let result = registry.dispatch(&call).await;
        assert!(!result.success);
        assert!(result.output.contains("schema_violation"));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn validate_accepts_extra_arguments() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["a"]
        });
        let args = serde_json::json!({"a": "x", "b": 1});
        assert!(validate_arguments(&schema, &args).is_ok());
    }

    #[test]
    fn validate_rejects_non_object_arguments() {
        let schema = serde_json::json!({"type": "object"});
        assert!(validate_arguments(&schema, &serde_json::json!("not an object")).is_err());
    }

    #[test]
    fn validate_integer_vs_number() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "n": { "type": "integer" } },
            "required": ["n"]
        });
        assert!(validate_arguments(&schema, &serde_json::json!({"n": 3})).is_ok());
        assert!(validate_arguments(&schema, &serde_json::json!({"n": 3.5})).is_err());
    }
}
