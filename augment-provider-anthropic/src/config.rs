//! Client configuration and API key resolution.

use augment_core::ProviderError;
use serde::{Deserialize, Serialize};

/// Default model used when neither the config nor the request names one.
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-latest";

/// Default Anthropic API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Value shipped in sample config files; treated as unset.
const PLACEHOLDER_KEY: &str = "<your-api-key-here>";

/// Anthropic settings, loadable from any serde format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// API key. Empty or placeholder values fall back to the environment.
    pub api_key: Option<String>,
    /// API base URL.
    pub base_url: String,
    /// Model used when a request does not name one.
    pub default_model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            default_model: DEFAULT_MODEL.into(),
        }
    }
}

impl AnthropicConfig {
    /// The key to send: the configured one, else `ANTHROPIC_API_KEY`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Authentication`] when neither is set.
    pub fn resolve_api_key(&self) -> Result<String, ProviderError> {
        pick_api_key(self.api_key.as_deref(), std::env::var(API_KEY_ENV).ok())
    }
}

fn pick_api_key(configured: Option<&str>, env: Option<String>) -> Result<String, ProviderError> {
    let configured = configured
        .map(str::trim)
        .filter(|key| !key.is_empty() && *key != PLACEHOLDER_KEY);
    if let Some(key) = configured {
        return Ok(key.to_string());
    }
    match env.filter(|key| !key.trim().is_empty()) {
        Some(key) => Ok(key),
        None => Err(ProviderError::Authentication(
            "Anthropic API key not configured".into(),
        )),
    }
}
