//! Delimited transcript format.
//!
//! Each message is written as its role delimiter on a line of its own,
//! followed by the normalized content. Messages are separated by a blank
//! line. Output is a pure function of the messages and the format, so
//! exporting the same history twice yields identical bytes.

use augment_core::{ContentBlock, ContentItem, Message, Role};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Role delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptFormat {
    /// Line that opens a user message.
    pub user_delimiter: String,
    /// Line that opens an assistant message.
    pub assistant_delimiter: String,
}

impl Default for TranscriptFormat {
    fn default() -> Self {
        Self {
            user_delimiter: "---USER".into(),
            assistant_delimiter: "---ASSISTANT".into(),
        }
    }
}

impl TranscriptFormat {
    fn delimiter(&self, role: Role) -> &str {
        match role {
            Role::User => &self.user_delimiter,
            Role::Assistant => &self.assistant_delimiter,
        }
    }
}

/// A block that could not be normalized to text.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Binary content with no text form.
    #[error("message {index} ({role}): unsupported content {media_type}")]
    UnsupportedContent {
        /// Position of the message in the transcript.
        index: usize,
        /// Author of the message.
        role: Role,
        /// MIME type of the content.
        media_type: String,
    },
}

/// Errors from exporting a transcript.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ExportError {
    /// The save command had no target path.
    #[error("invalid format, expected '***SAVE_HISTORY <filename.md>'")]
    InvalidCommand,

    /// Writing the file failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Rendered transcript text and any placeholders substituted into it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTranscript {
    /// The delimited text.
    pub text: String,
    /// Blocks rendered as placeholders.
    pub placeholders: Vec<FormatError>,
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// File written.
    pub path: PathBuf,
    /// Number of messages written.
    pub messages: usize,
    /// Blocks rendered as placeholders.
    pub placeholders: Vec<FormatError>,
}

fn normalize_item(
    item: &ContentItem,
    index: usize,
    role: Role,
    placeholders: &mut Vec<FormatError>,
) -> String {
    match item {
        ContentItem::Text { text } => text.clone(),
        ContentItem::Json { value } => value.to_string(),
        ContentItem::Image { media_type, .. } => {
            placeholders.push(FormatError::UnsupportedContent {
                index,
                role,
                media_type: media_type.clone(),
            });
            format!("[unsupported content: {media_type}]")
        }
    }
}

fn normalize_block(
    block: &ContentBlock,
    index: usize,
    role: Role,
    placeholders: &mut Vec<FormatError>,
) -> String {
    match block {
        ContentBlock::Text { text } => text.clone(),
        ContentBlock::ToolUse { id, name, input } => format!("[tool_use {name} {id}] {input}"),
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => {
            let mut lines = vec![if *is_error {
                format!("[tool_result {tool_use_id}] error")
            } else {
                format!("[tool_result {tool_use_id}]")
            }];
            lines.extend(
                content
                    .iter()
                    .map(|item| normalize_item(item, index, role, placeholders)),
            );
            lines.join("\n")
        }
    }
}

/// Render messages in the delimited format.
pub fn render_transcript(messages: &[Message], format: &TranscriptFormat) -> RenderedTranscript {
    let mut placeholders = Vec::new();
    let sections: Vec<String> = messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            let body: Vec<String> = message
                .content
                .iter()
                .map(|block| normalize_block(block, index, message.role, &mut placeholders))
                .collect();
            format!("{}\n{}", format.delimiter(message.role), body.join("\n"))
        })
        .collect();

    RenderedTranscript {
        text: sections.join("\n\n"),
        placeholders,
    }
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `messages` to `path` in the delimited format.
///
/// The text is written to a temporary file next to `path` and renamed over
/// it, so readers never observe a partial transcript.
pub async fn export_transcript(
    messages: &[Message],
    path: &Path,
    format: &TranscriptFormat,
) -> Result<ExportReport, ExportError> {
    let rendered = render_transcript(messages, format);
    for placeholder in &rendered.placeholders {
        tracing::warn!(error = %placeholder, "augment.transcript.placeholder");
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transcript".into());
    let tmp = dir.join(format!(
        ".{file_name}.{}.{}.tmp",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    tokio::fs::write(&tmp, rendered.text.as_bytes()).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(ExportError::Io(e));
    }

    tracing::debug!(path = %path.display(), messages = messages.len(), "augment.transcript.exported");
    Ok(ExportReport {
        path: path.to_path_buf(),
        messages: messages.len(),
        placeholders: rendered.placeholders,
    })
}

/// Parse delimited text back into text-only messages.
///
/// A line equal to a delimiter opens a new message. Text before the first
/// delimiter is read as a user message. Leading and trailing blank lines of
/// each message are dropped.
pub fn parse_delimited(text: &str, format: &TranscriptFormat) -> Vec<Message> {
    let mut messages = Vec::new();
    let mut role = Role::User;
    let mut lines: Vec<&str> = Vec::new();

    let mut flush = |role: Role, lines: &mut Vec<&str>| {
        let body = lines.join("\n");
        let body = body.trim_matches('\n');
        if !body.trim().is_empty() {
            messages.push(Message::new(role, vec![ContentBlock::text(body)]));
        }
        lines.clear();
    };

    for line in text.lines() {
        let next = if line == format.user_delimiter {
            Some(Role::User)
        } else if line == format.assistant_delimiter {
            Some(Role::Assistant)
        } else {
            None
        };
        match next {
            Some(next) => {
                flush(role, &mut lines);
                role = next;
            }
            None => lines.push(line),
        }
    }
    flush(role, &mut lines);
    messages
}
