//! Tool collaborator seams.
//!
//! The orchestrator never executes tools itself. It lists schemas through a
//! [`ToolCatalog`] and runs calls through a [`ToolInvoker`]; both are
//! object-safe so a session can hold them as `Arc<dyn _>`.

use crate::types::{ToolOutput, ToolSchema};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from tool lookup or execution.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool with this name is registered.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// The arguments did not match the tool's schema.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The tool ran and failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

/// Source of the currently available tools.
#[async_trait]
pub trait ToolCatalog: Send + Sync {
    /// Schemas of every available tool.
    async fn list_tools(&self) -> Vec<ToolSchema>;

    /// Counter bumped whenever the tool set changes.
    ///
    /// The orchestrator re-lists tools when this moves during a session.
    fn revision(&self) -> u64 {
        0
    }
}

/// Executes one tool call.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Run `name` with `arguments`. `call_id` identifies the originating
    /// `tool_use` block.
    async fn call(
        &self,
        name: &str,
        arguments: serde_json::Value,
        call_id: &str,
    ) -> Result<ToolOutput, ToolError>;
}

/// Catalog and invoker with no tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTools;

#[async_trait]
impl ToolCatalog for NoTools {
    async fn list_tools(&self) -> Vec<ToolSchema> {
        Vec::new()
    }
}

#[async_trait]
impl ToolInvoker for NoTools {
    async fn call(
        &self,
        name: &str,
        _arguments: serde_json::Value,
        _call_id: &str,
    ) -> Result<ToolOutput, ToolError> {
        Err(ToolError::NotFound(name.to_string()))
    }
}
