//! Provider trait for LLM backends.
//!
//! The [`Provider`] trait uses RPITIT (return-position `impl Trait` in
//! traits) and is not object-safe. The turn loop is generic over it.

use crate::types::{ProviderRequest, ProviderResponse, ToolSchema};
use std::future::Future;
use thiserror::Error;

/// Errors from LLM providers.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Credentials missing or rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The provider answered with a non-success status.
    #[error("api error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Human-readable message.
        message: String,
        /// Parsed error body, when it was JSON.
        body: Option<serde_json::Value>,
    },

    /// The provider rate-limited the request.
    #[error("rate limited ({status})")]
    RateLimited {
        /// HTTP status code.
        status: u16,
        /// Parsed error body, when it was JSON.
        body: Option<serde_json::Value>,
    },

    /// Transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Could not parse the provider's response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
    /// Whether this is a credential failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, ProviderError::Authentication(_))
    }

    /// HTTP status, when the provider returned one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } | ProviderError::RateLimited { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Best-effort description for a synthetic error reply.
    ///
    /// With a status code this reads `Error code: <status> - <body>`, using
    /// the JSON error body when there is one.
    pub fn diagnostic(&self) -> String {
        match self {
            ProviderError::Api {
                status,
                body: Some(body),
                ..
            }
            | ProviderError::RateLimited {
                status,
                body: Some(body),
            } => format!("Error code: {status} - {body}"),
            ProviderError::Api {
                status, message, ..
            } => format!("Error code: {status} - {message}"),
            ProviderError::RateLimited { status, body: None } => {
                format!("Error code: {status} - rate limited")
            }
            other => other.to_string(),
        }
    }
}

/// How the orchestrator should treat a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// End the session with an error.
    Fatal,
    /// Surface as a synthetic reply and finish normally.
    Recoverable,
}

/// LLM provider interface.
///
/// One implementation per backend. The orchestrator only uses these
/// capabilities: invoke, describe tools, classify errors.
pub trait Provider: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Perform one request/response exchange.
    fn invoke(
        &self,
        request: ProviderRequest,
    ) -> impl Future<Output = Result<ProviderResponse, ProviderError>> + Send;

    /// Adapt the catalog's tool schemas to what this backend accepts.
    fn describe_tools(&self, tools: &[ToolSchema]) -> Vec<ToolSchema> {
        tools.to_vec()
    }

    /// Decide whether a failure ends the session.
    fn classify_error(&self, error: &ProviderError) -> ErrorClass {
        if error.is_auth() {
            ErrorClass::Fatal
        } else {
            ErrorClass::Recoverable
        }
    }
}
