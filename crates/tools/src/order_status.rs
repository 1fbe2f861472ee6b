//! Order status lookup tool — stub returning a canned shipping record.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use helpbot_core::error::ToolError;
use helpbot_core::tool::{Tool, ToolResult};
use tracing::info;

pub struct OrderStatusTool;

#[async_trait]
impl Tool for OrderStatusTool {
    fn name(&self) -> &str {
        "get_order_status"
    }

    fn description(&self) -> &str {
        "Look up the current shipping status for a specific order_id."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "order_id": {
                    "type": "string",
                    "description": "Opaque identifier of the order."
                }
            },
            "required": ["order_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        // Arguments were validated by the registry; a missing order_id
        // here would mean the dispatch chokepoint was bypassed.
        let order_id = arguments["order_id"].as_str().ok_or_else(|| {
            ToolError::SchemaViolation("missing required parameter 'order_id'".into())
        })?;

        info!(order_id, "Tool get_order_status called");

        let estimated_delivery = (Utc::now() + Duration::days(5)).format("%Y-%m-%d").to_string();
        let record = serde_json::json!({
            "order_id": order_id,
            "status": "shipped",
            "estimated_delivery": estimated_delivery,
            "carrier": "Acme Logistics"
        });

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: record.to_string(),
        })
    }
}
