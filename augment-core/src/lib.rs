#![deny(missing_docs)]
//! Shared vocabulary for the augment turn loop.
//!
//! Provides the [`Provider`] trait for model calls, the [`ToolCatalog`]
//! and [`ToolInvoker`] seams for tools, [`RequestParams`] for per-session
//! configuration, and the message types every other crate speaks.

pub mod convert;
pub mod params;
pub mod provider;
pub mod tool;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports
pub use convert::{Prompt, render_message, tool_result_block, tool_results_message};
pub use params::RequestParams;
pub use provider::{ErrorClass, Provider, ProviderError};
pub use tool::{NoTools, ToolCatalog, ToolError, ToolInvoker};
pub use types::*;
