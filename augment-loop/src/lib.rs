#![deny(missing_docs)]
//! Multi-turn, tool-augmented orchestration loop.
//!
//! [`TurnOrchestrator`] drives a single session: it calls the provider,
//! reads the stop reason, runs requested tools through the
//! [`ToolInvoker`](augment_core::ToolInvoker), and folds their results back
//! in until the model finishes or `max_iterations` is reached.
//!
//! [`Session`] wraps an orchestrator with a
//! [`ConversationHistory`](augment_history::ConversationHistory) and
//! exposes the caller-facing entry points: `generate`, `generate_text`
//! (which also handles `***SAVE_HISTORY <path>`), `generate_structured`
//! and `apply_prompt_template`.

pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod session;
pub mod structured;

pub use config::{OrchestratorConfig, SessionConfig, ToolExecution};
pub use context::SessionContext;
pub use error::{SessionError, StructuredError};
pub use orchestrator::{SessionOutcome, TurnOrchestrator, synthetic_error_response};
pub use session::Session;
pub use structured::{extract_structured, repair_json};
