//! Configuration types for the turn loop.

use augment_core::RequestParams;
use augment_history::TranscriptFormat;
use serde::{Deserialize, Serialize};

/// How the tools requested in one turn are run.
///
/// Results are appended in call order under either policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolExecution {
    /// One after another.
    #[default]
    Sequential,
    /// All at once.
    Concurrent,
}

/// Static configuration for a [`TurnOrchestrator`](crate::TurnOrchestrator).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Tool execution policy.
    pub tool_execution: ToolExecution,
}

/// Everything a [`Session`](crate::Session) can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Default request parameters.
    pub params: RequestParams,
    /// Orchestrator settings.
    pub orchestrator: OrchestratorConfig,
    /// Transcript export delimiters.
    pub transcript: TranscriptFormat,
}
