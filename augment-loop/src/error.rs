//! Session error types.

use augment_core::ProviderError;
use thiserror::Error;

/// Errors that end a session without a result.
///
/// Recoverable provider failures and tool failures never appear here; they
/// are folded into the transcript as data.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// The provider rejected the credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The provider classified a non-credential failure as fatal.
    #[error("provider error: {0}")]
    Provider(ProviderError),

    /// The caller cancelled the session.
    #[error("session cancelled")]
    Cancelled,
}

/// Errors from structured extraction.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StructuredError {
    /// The session itself failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The output could not be read as the requested type.
    #[error("could not parse structured output: {message}")]
    Parse {
        /// Parser message.
        message: String,
        /// Text that failed to parse.
        raw: String,
    },
}
