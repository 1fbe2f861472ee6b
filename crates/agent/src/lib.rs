//! The conversation orchestration loop — the heart of HelpBot.
//!
//! Per inbound user message the orchestrator:
//!
//! 1. **Locks** the session and snapshots its history
//! 2. **Retrieves** grounding passages for the message
//! 3. **Assembles** the prompt (persona + context + history + tool schemas)
//! 4. **Calls the model**; while it keeps requesting tools, dispatches them
//!    and resubmits the results (bounded by a hard round cap)
//! 5. **Appends** the full turn to the session and returns the reply
//!
//! Grounding and clarification policy live in the system instructions;
//! the orchestrator enforces only the structural round cap and schema
//! validation.

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{Orchestrator, ROUND_CAP_REPLY};
pub use prompt::PromptAssembler;
