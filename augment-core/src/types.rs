//! Message, content and exchange types.
//!
//! These are the lingua franca of the workspace. Providers convert to and
//! from their own wire formats; the orchestrator, tools and history only
//! ever see these.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The caller (and tool results sent on its behalf).
    User,
    /// The model.
    Assistant,
}

impl Role {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item of a tool result payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Structured content.
    Json {
        /// The value.
        value: serde_json::Value,
    },
    /// Base64 image data.
    Image {
        /// MIME type, e.g. `image/png`.
        media_type: String,
        /// Base64-encoded bytes.
        data: String,
    },
}

impl ContentItem {
    /// Shorthand for a text item.
    pub fn text(text: impl Into<String>) -> Self {
        ContentItem::Text { text: text.into() }
    }
}

/// A block of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// A tool invocation requested by the model. Assistant messages only.
    ToolUse {
        /// Call identifier, unique within the session.
        id: String,
        /// Tool name.
        name: String,
        /// Tool arguments.
        input: serde_json::Value,
    },
    /// Outcome of a tool invocation. User-role continuation messages only.
    ToolResult {
        /// Identifier of the originating `ToolUse`.
        tool_use_id: String,
        /// Result payload.
        content: Vec<ContentItem>,
        /// Whether the invocation failed.
        #[serde(default)]
        is_error: bool,
    },
}

impl ContentBlock {
    /// Shorthand for a text block.
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// The text of a `Text` block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A message in a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author.
    pub role: Role,
    /// Ordered content.
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a message from parts.
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    /// A user message holding one text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentBlock::text(text)])
    }

    /// An assistant message holding one text block.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentBlock::text(text)])
    }

    /// Concatenated text of all `Text` blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect()
    }

    /// Tool calls requested in this message, in emission order.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCall {
                    id: id.clone(),
                    name: name.clone(),
                    arguments: input.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Whether any block is a `ToolUse`.
    pub fn has_tool_use(&self) -> bool {
        self.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }
}

/// Why the provider stopped generating.
///
/// Unknown provider values are preserved in `Other` rather than coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StopReason {
    /// The model finished its reply.
    EndTurn,
    /// A configured stop sequence was produced.
    StopSequence,
    /// The output token limit was hit.
    MaxTokens,
    /// The model wants tool results.
    ToolUse,
    /// Any other provider-specific reason.
    Other(String),
}

impl StopReason {
    /// Parse a wire value.
    pub fn parse(value: &str) -> Self {
        match value {
            "end_turn" => StopReason::EndTurn,
            "stop_sequence" => StopReason::StopSequence,
            "max_tokens" => StopReason::MaxTokens,
            "tool_use" => StopReason::ToolUse,
            other => StopReason::Other(other.to_string()),
        }
    }

    /// Wire value.
    pub fn as_str(&self) -> &str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::StopSequence => "stop_sequence",
            StopReason::MaxTokens => "max_tokens",
            StopReason::ToolUse => "tool_use",
            StopReason::Other(other) => other,
        }
    }
}

impl From<String> for StopReason {
    fn from(value: String) -> Self {
        StopReason::parse(&value)
    }
}

impl From<StopReason> for String {
    fn from(value: StopReason) -> Self {
        value.as_str().to_string()
    }
}

/// Token counts for one or more provider calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens generated.
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Add another call's usage to this total.
    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Tool description handed to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema of the arguments.
    pub input_schema: serde_json::Value,
}

/// A tool invocation extracted from a `ToolUse` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Arguments.
    pub arguments: serde_json::Value,
}

/// Successful (or tool-reported failed) tool outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Result payload.
    pub content: Vec<ContentItem>,
    /// Whether the tool itself reported an error.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolOutput {
    /// A text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
            is_error: false,
        }
    }

    /// A structured result.
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            content: vec![ContentItem::Json { value }],
            is_error: false,
        }
    }

    /// A tool-reported error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(message)],
            is_error: true,
        }
    }
}

/// One request to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Model identifier (None = provider default).
    pub model: Option<String>,
    /// Ordered conversation.
    pub messages: Vec<Message>,
    /// System prompt.
    pub system: Option<String>,
    /// Stop sequences, possibly empty.
    #[serde(default)]
    pub stop_sequences: Vec<String>,
    /// Available tools.
    #[serde(default)]
    pub tools: Vec<ToolSchema>,
    /// Output token limit.
    pub max_tokens: Option<u32>,
    /// Whether the model may request several tools in one turn.
    #[serde(default = "default_true")]
    pub parallel_tool_calls: bool,
    /// Provider-specific overrides, merged over everything else.
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

fn default_true() -> bool {
    true
}

/// One provider reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Provider message id.
    pub id: String,
    /// Model that produced the reply.
    pub model: String,
    /// Author, always the assistant for well-formed replies.
    #[serde(default = "assistant_role")]
    pub role: Role,
    /// Reply content.
    pub content: Vec<ContentBlock>,
    /// Why generation stopped.
    pub stop_reason: StopReason,
    /// Token usage.
    #[serde(default)]
    pub usage: TokenUsage,
}

fn assistant_role() -> Role {
    Role::Assistant
}

impl ProviderResponse {
    /// The reply as a transcript message.
    pub fn to_message(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }

    /// Concatenated text content.
    pub fn text(&self) -> String {
        self.content.iter().filter_map(ContentBlock::as_text).collect()
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// `end_turn`, `stop_sequence` or an unknown reason with nothing to run.
    Completed,
    /// The output token limit was reached.
    Truncated,
    /// A provider failure was turned into a synthetic reply.
    ProviderError,
    /// The iteration bound was reached with tools still requested.
    MaxIterations,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_block_tags() {
        let block = ContentBlock::ToolUse {
            id: "tu_1".into(),
            name: "search".into(),
            input: json!({"query": "x"}),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_use");
        assert_eq!(value["input"]["query"], "x");

        let result: ContentBlock = serde_json::from_value(json!({
            "type": "tool_result",
            "tool_use_id": "tu_1",
            "content": [{"type": "text", "text": "ok"}]
        }))
        .unwrap();
        assert!(matches!(result, ContentBlock::ToolResult { is_error: false, .. }));
    }

    #[test]
    fn stop_reason_keeps_unknown_values() {
        assert_eq!(StopReason::parse("tool_use"), StopReason::ToolUse);
        let other = StopReason::parse("pause_turn");
        assert_eq!(other, StopReason::Other("pause_turn".into()));
        assert_eq!(serde_json::to_value(&other).unwrap(), json!("pause_turn"));
        let back: StopReason = serde_json::from_value(json!("max_tokens")).unwrap();
        assert_eq!(back, StopReason::MaxTokens);
    }

    #[test]
    fn message_text_concatenates_text_blocks() {
        let msg = Message::new(
            Role::Assistant,
            vec![
                ContentBlock::text("Hello, "),
                ContentBlock::ToolUse {
                    id: "a".into(),
                    name: "t".into(),
                    input: json!({}),
                },
                ContentBlock::text("world"),
            ],
        );
        assert_eq!(msg.text(), "Hello, world");
        assert!(msg.has_tool_use());
        let calls = msg.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "a");
    }

    #[test]
    fn usage_accumulates() {
        let mut total = TokenUsage::default();
        total.accumulate(&TokenUsage {
            input_tokens: 3,
            output_tokens: 4,
        });
        total.accumulate(&TokenUsage {
            input_tokens: 1,
            output_tokens: 1,
        });
        assert_eq!(total.input_tokens, 4);
        assert_eq!(total.output_tokens, 5);
    }

    #[test]
    fn request_defaults_parallel_tool_calls() {
        let req: ProviderRequest = serde_json::from_value(json!({
            "model": null,
            "messages": [],
            "system": null,
            "max_tokens": null
        }))
        .unwrap();
        assert!(req.parallel_tool_calls);
        assert!(req.tools.is_empty());
    }
}
