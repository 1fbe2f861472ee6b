//! Email dispatch tool — stub that simulates sending.

use async_trait::async_trait;
use helpbot_core::error::ToolError;
use helpbot_core::tool::{Tool, ToolResult};
use tracing::info;

pub struct SendEmailTool;

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send an email message to a recipient (simulated)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "recipient_email": {
                    "type": "string",
                    "description": "Destination email address."
                },
                "message": {
                    "type": "string",
                    "description": "Plain text content to send."
                }
            },
            "required": ["recipient_email", "message"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let recipient = arguments["recipient_email"].as_str().ok_or_else(|| {
            ToolError::SchemaViolation("missing required parameter 'recipient_email'".into())
        })?;
        let message = arguments["message"].as_str().ok_or_else(|| {
            ToolError::SchemaViolation("missing required parameter 'message'".into())
        })?;

        info!(recipient, message_len = message.len(), "Tool send_email called");

        let preview: String = message.chars().take(60).collect();
        let receipt = serde_json::json!({
            "accepted": true,
            "recipient": recipient,
            "message_preview": preview,
            "detail": "Email sent (simulated)."
        });

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: receipt.to_string(),
        })
    }
}
