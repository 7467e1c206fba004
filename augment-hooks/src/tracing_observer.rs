//! [`Observer`] that writes events to [`tracing`].

use crate::{Observer, ObserverError, SessionEvent};
use async_trait::async_trait;

/// Emits one structured `tracing` event per session event.
///
/// | Event | Level |
/// |-------|-------|
/// | TurnStarted, ToolCall, ToolResult | `DEBUG` |
/// | UserMessage, AssistantMessage, SessionFinished | `INFO` |
///
/// Message text is not logged, only sizes and identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TracingObserver {
    /// Create a new `TracingObserver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observer for TracingObserver {
    async fn on_event(&self, event: &SessionEvent) -> Result<(), ObserverError> {
        match event {
            SessionEvent::UserMessage {
                message,
                chat_turn,
                model,
            } => {
                tracing::info!(
                    chat_turn,
                    model = model.as_deref().unwrap_or("default"),
                    blocks = message.content.len(),
                    "augment.session.user_message"
                );
            }
            SessionEvent::TurnStarted {
                iteration,
                chat_turn,
                model,
            } => {
                tracing::debug!(
                    iteration,
                    chat_turn,
                    model = model.as_deref().unwrap_or("default"),
                    "augment.loop.iteration"
                );
            }
            SessionEvent::AssistantMessage {
                text,
                notice,
                tool_name,
                chat_turn,
                model,
            } => {
                tracing::info!(
                    chat_turn,
                    model = model.as_deref().unwrap_or("default"),
                    chars = text.len(),
                    notice = notice.as_deref(),
                    tool = tool_name.as_deref(),
                    "augment.session.assistant_message"
                );
            }
            SessionEvent::ToolCall { call } => {
                tracing::debug!(tool = %call.name, call_id = %call.id, "augment.tool.pre_call");
            }
            SessionEvent::ToolResult {
                call_id,
                name,
                is_error,
                ..
            } => {
                tracing::debug!(tool = %name, call_id = %call_id, is_error, "augment.tool.post_call");
            }
            SessionEvent::SessionFinished {
                termination,
                iterations,
                usage,
            } => {
                tracing::info!(
                    termination = ?termination,
                    iterations,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "augment.session.finished"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use augment_core::{Termination, TokenUsage, ToolCall};

    #[tokio::test]
    async fn never_fails() {
        let observer = TracingObserver::new();
        let events = [
            SessionEvent::ToolCall {
                call: ToolCall {
                    id: "tu_1".into(),
                    name: "search".into(),
                    arguments: serde_json::json!({}),
                },
            },
            SessionEvent::SessionFinished {
                termination: Termination::Completed,
                iterations: 1,
                usage: TokenUsage::default(),
            },
        ];
        for event in &events {
            assert!(observer.on_event(event).await.is_ok());
        }
    }
}
