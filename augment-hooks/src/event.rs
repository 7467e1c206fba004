//! Events emitted by the turn loop.

use augment_core::{ContentItem, Message, Termination, TokenUsage, ToolCall};

/// Something the session shows or reports to the caller.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The last prompt message, before the first provider call.
    UserMessage {
        /// The message.
        message: Message,
        /// Exchange number within the conversation, starting at 1.
        chat_turn: usize,
        /// Requested model.
        model: Option<String>,
    },
    /// A provider call is about to be made.
    TurnStarted {
        /// Iteration within this session, starting at 1.
        iteration: u32,
        /// Exchange number within the conversation.
        chat_turn: usize,
        /// Requested model.
        model: Option<String>,
    },
    /// An assistant reply, shown once per terminal, truncated or tool turn.
    AssistantMessage {
        /// Text of the reply.
        text: String,
        /// Notice such as a token-limit warning.
        notice: Option<String>,
        /// First requested tool, for tool turns.
        tool_name: Option<String>,
        /// Exchange number within the conversation.
        chat_turn: usize,
        /// Model that replied.
        model: Option<String>,
    },
    /// A tool is about to run.
    ToolCall {
        /// The call.
        call: ToolCall,
    },
    /// A tool finished.
    ToolResult {
        /// Identifier of the originating call.
        call_id: String,
        /// Tool name.
        name: String,
        /// Result payload.
        content: Vec<ContentItem>,
        /// Whether the call failed.
        is_error: bool,
    },
    /// The session reached a terminal state.
    SessionFinished {
        /// How it ended.
        termination: Termination,
        /// Provider calls made.
        iterations: u32,
        /// Accumulated token usage.
        usage: TokenUsage,
    },
}

impl SessionEvent {
    /// Stable name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::UserMessage { .. } => "user_message",
            SessionEvent::TurnStarted { .. } => "turn_started",
            SessionEvent::AssistantMessage { .. } => "assistant_message",
            SessionEvent::ToolCall { .. } => "tool_call",
            SessionEvent::ToolResult { .. } => "tool_result",
            SessionEvent::SessionFinished { .. } => "session_finished",
        }
    }
}
