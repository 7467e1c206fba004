//! Explicit per-session context.

use augment_core::RequestParams;
use augment_hooks::ObserverRegistry;
use tokio_util::sync::CancellationToken;

/// Everything one run of the orchestrator needs besides the transcript.
pub struct SessionContext {
    /// Parameters for this session.
    pub params: RequestParams,
    /// Observers that receive display events.
    pub observers: ObserverRegistry,
    /// Fired by the caller to abort the session.
    pub cancel: CancellationToken,
    /// Span every event of the session is recorded under.
    pub span: tracing::Span,
}

impl SessionContext {
    /// Context with no observers and a fresh token.
    pub fn new(params: RequestParams) -> Self {
        let span = tracing::info_span!(
            "augment.session",
            model = params.model.as_deref().unwrap_or("default"),
            max_iterations = params.max_iterations,
        );
        Self {
            params,
            observers: ObserverRegistry::new(),
            cancel: CancellationToken::new(),
            span,
        }
    }

    /// Replace the observers.
    #[must_use]
    pub fn with_observers(mut self, observers: ObserverRegistry) -> Self {
        self.observers = observers;
        self
    }

    /// Use `cancel` as the session's cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}
