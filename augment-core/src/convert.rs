//! Content normalization helpers.

use crate::tool::ToolError;
use crate::types::{ContentBlock, ContentItem, Message, Role, ToolCall, ToolOutput};

/// Caller input for one session.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    /// A single user text.
    Text(String),
    /// One or more prepared messages.
    Messages(Vec<Message>),
}

impl Prompt {
    /// The messages this prompt appends to the transcript.
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            Prompt::Text(text) => vec![Message::user(text)],
            Prompt::Messages(messages) => messages,
        }
    }

    /// The raw text, if this is a plain text prompt.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Prompt::Text(text) => Some(text),
            Prompt::Messages(_) => None,
        }
    }
}

impl From<&str> for Prompt {
    fn from(value: &str) -> Self {
        Prompt::Text(value.to_string())
    }
}

impl From<String> for Prompt {
    fn from(value: String) -> Self {
        Prompt::Text(value)
    }
}

impl From<Message> for Prompt {
    fn from(value: Message) -> Self {
        Prompt::Messages(vec![value])
    }
}

impl From<Vec<Message>> for Prompt {
    fn from(value: Vec<Message>) -> Self {
        Prompt::Messages(value)
    }
}

/// Turn a tool outcome into the `ToolResult` block answering `call`.
///
/// Invocation failures become error-flagged results carrying the error text.
pub fn tool_result_block(call: &ToolCall, result: Result<ToolOutput, ToolError>) -> ContentBlock {
    let output = result.unwrap_or_else(|e| ToolOutput::error(e.to_string()));
    ContentBlock::ToolResult {
        tool_use_id: call.id.clone(),
        content: output.content,
        is_error: output.is_error,
    }
}

/// The single user-role message carrying a turn's tool results.
pub fn tool_results_message(results: Vec<ContentBlock>) -> Message {
    Message::new(Role::User, results)
}

/// Display form of a tool result item.
pub fn render_item(item: &ContentItem) -> String {
    match item {
        ContentItem::Text { text } => text.clone(),
        ContentItem::Json { value } => value.to_string(),
        ContentItem::Image { media_type, .. } => format!("[Image: {media_type}]"),
    }
}

/// Display form of a content block.
pub fn render_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Text { text } => text.clone(),
        ContentBlock::ToolUse { name, input, .. } => format!("[Tool call: {name} {input}]"),
        ContentBlock::ToolResult {
            content, is_error, ..
        } => {
            let body: Vec<String> = content.iter().map(render_item).collect();
            if *is_error {
                format!("[Tool error: {}]", body.join("\n"))
            } else {
                body.join("\n")
            }
        }
    }
}

const NON_TEXT_NOTE: &str =
    "[Note: This message contained non-text content that may not be fully represented in text format]";

/// Display form of a whole message, blocks separated by blank lines.
///
/// A message holding anything besides text blocks ends with a note saying so.
pub fn render_message(message: &Message) -> String {
    let mut parts: Vec<String> = message.content.iter().map(render_block).collect();
    if message
        .content
        .iter()
        .any(|block| !matches!(block, ContentBlock::Text { .. }))
    {
        parts.push(NON_TEXT_NOTE.to_string());
    }
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call() -> ToolCall {
        ToolCall {
            id: "tu_1".into(),
            name: "search".into(),
            arguments: json!({"query": "x"}),
        }
    }

    #[test]
    fn failed_invocation_is_flagged() {
        let block = tool_result_block(&call(), Err(ToolError::ExecutionFailed("boom".into())));
        assert_eq!(
            block,
            ContentBlock::ToolResult {
                tool_use_id: "tu_1".into(),
                content: vec![ContentItem::text("execution failed: boom")],
                is_error: true,
            }
        );
    }

    #[test]
    fn successful_invocation_keeps_content() {
        let block = tool_result_block(&call(), Ok(ToolOutput::json(json!({"hits": 2}))));
        match block {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                assert_eq!(tool_use_id, "tu_1");
                assert!(!is_error);
                assert_eq!(render_item(&content[0]), r#"{"hits":2}"#);
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn prompt_conversions() {
        assert_eq!(Prompt::from("hi").into_messages(), vec![Message::user("hi")]);
        let msgs = vec![Message::user("a"), Message::assistant("b")];
        assert_eq!(Prompt::from(msgs.clone()).into_messages(), msgs);
        assert!(Prompt::from(Message::user("x")).as_text().is_none());
    }

    #[test]
    fn render_uses_placeholders_for_images() {
        let msg = Message::new(
            Role::User,
            vec![
                ContentBlock::text("look"),
                ContentBlock::ToolResult {
                    tool_use_id: "tu_1".into(),
                    content: vec![ContentItem::Image {
                        media_type: "image/png".into(),
                        data: "AAAA".into(),
                    }],
                    is_error: false,
                },
            ],
        );
        assert_eq!(
            render_message(&msg),
            format!("look\n\n[Image: image/png]\n\n{NON_TEXT_NOTE}")
        );
    }

    #[test]
    fn text_only_message_has_no_note() {
        let msg = Message::new(
            Role::Assistant,
            vec![ContentBlock::text("first"), ContentBlock::text("second")],
        );
        assert_eq!(render_message(&msg), "first\n\nsecond");
    }
}
