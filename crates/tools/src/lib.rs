//! Support tool implementations for HelpBot.
//!
//! Both tools are synchronous stubs returning canned data — the dispatch
//! contract is agnostic to whether they are real or simulated, and the
//! orchestration loop is exercised entirely through that contract.

pub mod order_status;
pub mod send_email;

use helpbot_core::tool::ToolRegistry;

/// Create the support tool registry with both built-in tools.
pub fn support_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(order_status::OrderStatusTool));
    registry.register(Box::new(send_email::SendEmailTool));
    registry
}
