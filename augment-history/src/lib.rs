#![deny(missing_docs)]
//! Conversation history and transcript export.
//!
//! [`ConversationHistory`] keeps two segments: the *prompt* segment
//! (messages applied from a prompt template, replayed on every session and
//! never rewritten by reconciliation) and the *conversation* segment (the
//! generated tail, replaced wholesale after each completed session).

pub mod command;
pub mod transcript;

pub use command::{SAVE_HISTORY_COMMAND, SaveHistoryCommand};
pub use transcript::{
    ExportError, ExportReport, FormatError, RenderedTranscript, TranscriptFormat,
    export_transcript, parse_delimited, render_transcript,
};

use augment_core::Message;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered store of prior turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistory {
    #[serde(default)]
    prompt: Vec<Message>,
    #[serde(default)]
    conversation: Vec<Message>,
}

impl ConversationHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages to seed a session with: the prompt segment, followed by the
    /// conversation when `include_history` is set.
    pub fn get(&self, include_history: bool) -> Vec<Message> {
        let mut messages = self.prompt.clone();
        if include_history {
            messages.extend(self.conversation.iter().cloned());
        }
        messages
    }

    /// Replace the conversation segment.
    pub fn set(&mut self, messages: Vec<Message>) {
        self.conversation = messages;
    }

    /// Append to the prompt segment (`is_prompt`) or the conversation.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>, is_prompt: bool) {
        if is_prompt {
            self.prompt.extend(messages);
        } else {
            self.conversation.extend(messages);
        }
    }

    /// Replace the conversation with everything in `transcript` after the
    /// prompt segment.
    ///
    /// `transcript` must start with the messages returned by `get`.
    pub fn reconcile(&mut self, transcript: &[Message]) {
        let start = self.prompt.len().min(transcript.len());
        self.conversation = transcript[start..].to_vec();
    }

    /// The prompt segment.
    pub fn prompt(&self) -> &[Message] {
        &self.prompt
    }

    /// The conversation segment.
    pub fn conversation(&self) -> &[Message] {
        &self.conversation
    }

    /// Total number of stored messages.
    pub fn len(&self) -> usize {
        self.prompt.len() + self.conversation.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the conversation, keeping the prompt segment.
    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// Drop both segments.
    pub fn clear_all(&mut self) {
        self.prompt.clear();
        self.conversation.clear();
    }

    /// Write the full history (prompt and conversation) to `path`.
    pub async fn export(
        &self,
        path: &Path,
        format: &TranscriptFormat,
    ) -> Result<ExportReport, ExportError> {
        export_transcript(&self.get(true), path, format).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_respects_include_history() {
        let mut history = ConversationHistory::new();
        history.extend([Message::user("template")], true);
        history.extend([Message::user("Hi"), Message::assistant("Hello")], false);

        assert_eq!(history.get(false), vec![Message::user("template")]);
        assert_eq!(history.get(true).len(), 3);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn reconcile_keeps_prompt_segment() {
        let mut history = ConversationHistory::new();
        history.extend([Message::user("template")], true);

        let mut transcript = history.get(true);
        transcript.push(Message::user("Hi"));
        transcript.push(Message::assistant("Hello"));
        history.reconcile(&transcript);

        assert_eq!(history.prompt(), &[Message::user("template")]);
        assert_eq!(
            history.conversation(),
            &[Message::user("Hi"), Message::assistant("Hello")]
        );

        // Rerunning replaces the tail rather than duplicating the prompt.
        let mut transcript = history.get(true);
        transcript.push(Message::user("Again"));
        transcript.push(Message::assistant("Sure"));
        history.reconcile(&transcript);
        assert_eq!(history.prompt().len(), 1);
        assert_eq!(history.conversation().len(), 4);
    }

    #[test]
    fn clear_keeps_prompt() {
        let mut history = ConversationHistory::new();
        history.extend([Message::user("p")], true);
        history.set(vec![Message::user("c")]);
        history.clear();
        assert_eq!(history.len(), 1);
        history.clear_all();
        assert!(history.is_empty());
    }

    #[test]
    fn serde_roundtrip() {
        let mut history = ConversationHistory::new();
        history.extend([Message::user("p")], true);
        history.set(vec![Message::assistant("c")]);
        let json = serde_json::to_string(&history).unwrap();
        let back: ConversationHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
    }
}
