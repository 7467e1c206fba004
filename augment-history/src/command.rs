//! The `***SAVE_HISTORY <path>` text command.

use crate::transcript::ExportError;
use std::path::PathBuf;

/// Prefix that marks a save command.
pub const SAVE_HISTORY_COMMAND: &str = "***SAVE_HISTORY";

/// A parsed save command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveHistoryCommand {
    /// Target file.
    pub path: PathBuf,
}

impl SaveHistoryCommand {
    /// Recognize a save command.
    ///
    /// Returns `None` when `input` is ordinary text, and
    /// `Some(Err(ExportError::InvalidCommand))` when the command is present
    /// but the path is blank.
    pub fn parse(input: &str) -> Option<Result<Self, ExportError>> {
        let rest = input
            .strip_prefix(SAVE_HISTORY_COMMAND)?
            .strip_prefix(' ')?;
        let path = rest.trim();
        if path.is_empty() {
            return Some(Err(ExportError::InvalidCommand));
        }
        Some(Ok(Self {
            path: PathBuf::from(path),
        }))
    }

    /// Reply returned when the path is missing.
    pub fn usage() -> String {
        format!("Error: Invalid format. Expected '{SAVE_HISTORY_COMMAND} <filename.md>'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_text_is_not_a_command() {
        assert!(SaveHistoryCommand::parse("hello").is_none());
        assert!(SaveHistoryCommand::parse("***SAVE_HISTORY").is_none());
        assert!(SaveHistoryCommand::parse("say ***SAVE_HISTORY x.md").is_none());
    }

    #[test]
    fn path_is_trimmed() {
        let cmd = SaveHistoryCommand::parse("***SAVE_HISTORY   out/chat.md  ")
            .unwrap()
            .unwrap();
        assert_eq!(cmd.path, PathBuf::from("out/chat.md"));
    }

    #[test]
    fn blank_path_is_invalid() {
        let err = SaveHistoryCommand::parse("***SAVE_HISTORY    ")
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidCommand));
        assert_eq!(
            SaveHistoryCommand::usage(),
            "Error: Invalid format. Expected '***SAVE_HISTORY <filename.md>'"
        );
    }
}
