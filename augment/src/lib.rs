#![deny(missing_docs)]
//! # augment, the umbrella crate
//!
//! Single import surface for the augment crates. Re-exports each crate
//! behind a feature flag, plus a `prelude` for the happy path.

#[cfg(feature = "core")]
pub use augment_core;
#[cfg(feature = "history")]
pub use augment_history;
#[cfg(feature = "hooks")]
pub use augment_hooks;
#[cfg(feature = "loop")]
pub use augment_loop;
#[cfg(feature = "provider-anthropic")]
pub use augment_provider_anthropic;
#[cfg(feature = "tool")]
pub use augment_tool;

/// Happy-path imports for running sessions.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use augment_core::{
        ContentBlock, Message, Prompt, Provider, ProviderError, ProviderResponse, RequestParams,
        Role, StopReason, Termination, ToolCatalog, ToolError, ToolInvoker, ToolOutput,
    };

    #[cfg(feature = "tool")]
    pub use augment_tool::{ToolDyn, ToolFn, ToolRegistry};

    #[cfg(feature = "hooks")]
    pub use augment_hooks::{Observer, ObserverRegistry, SessionEvent, TracingObserver};

    #[cfg(feature = "history")]
    pub use augment_history::{ConversationHistory, TranscriptFormat};

    #[cfg(feature = "loop")]
    pub use augment_loop::{
        Session, SessionConfig, SessionError, SessionOutcome, StructuredError, TurnOrchestrator,
    };

    #[cfg(feature = "provider-anthropic")]
    pub use augment_provider_anthropic::{Anthropic, AnthropicConfig};
}
