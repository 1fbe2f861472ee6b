//! LLM provider implementations for HelpBot.
//!
//! All providers implement the `helpbot_core::Provider` trait. Transient
//! failure handling lives here — `RetryProvider` wraps the concrete
//! provider with bounded exponential backoff, so the orchestrator sees a
//! single `complete()` that either succeeds or has genuinely exhausted
//! its retries.

pub mod anthropic;
pub mod retry;

pub use anthropic::AnthropicProvider;
pub use retry::{RetryPolicy, RetryProvider};
