//! Per-session request parameters.

use serde::{Deserialize, Serialize};

/// Configuration snapshot for one session.
///
/// Deserializes with every field optional; missing fields take the
/// [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestParams {
    /// Model identifier. `None` uses the provider's default model.
    pub model: Option<String>,
    /// Output token limit per provider call.
    pub max_tokens: Option<u32>,
    /// System prompt.
    pub system_prompt: Option<String>,
    /// Stop sequences.
    pub stop_sequences: Vec<String>,
    /// Upper bound on provider calls per session.
    pub max_iterations: u32,
    /// Replay stored history and reconcile it after the session.
    pub use_history: bool,
    /// Tell the provider it may request several tools per turn.
    pub parallel_tool_calls: bool,
    /// Provider-specific request overrides, applied last.
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: Some(4096),
            system_prompt: None,
            stop_sequences: Vec::new(),
            max_iterations: 10,
            use_history: true,
            parallel_tool_calls: true,
            metadata: None,
        }
    }
}

impl RequestParams {
    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set (or clear) the output token limit.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Add a stop sequence.
    #[must_use]
    pub fn with_stop_sequence(mut self, stop: impl Into<String>) -> Self {
        self.stop_sequences.push(stop.into());
        self
    }

    /// Set the iteration bound.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Enable or disable history replay and reconciliation.
    #[must_use]
    pub fn with_history(mut self, use_history: bool) -> Self {
        self.use_history = use_history;
        self
    }

    /// Enable or disable parallel tool requests.
    #[must_use]
    pub fn with_parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.parallel_tool_calls = parallel;
        self
    }

    /// Add a provider metadata override.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let params = RequestParams::default();
        assert_eq!(params.max_tokens, Some(4096));
        assert_eq!(params.max_iterations, 10);
        assert!(params.use_history);
        assert!(params.parallel_tool_calls);
        assert!(params.metadata.is_none());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let params: RequestParams =
            serde_json::from_value(json!({"model": "m", "max_iterations": 3})).unwrap();
        assert_eq!(params.model.as_deref(), Some("m"));
        assert_eq!(params.max_iterations, 3);
        assert_eq!(params.max_tokens, Some(4096));
    }

    #[test]
    fn builders_compose() {
        let params = RequestParams::default()
            .with_model("claude")
            .with_stop_sequence("END")
            .with_metadata("temperature", json!(0.2))
            .with_history(false);
        assert_eq!(params.stop_sequences, vec!["END".to_string()]);
        assert_eq!(params.metadata.unwrap()["temperature"], json!(0.2));
        assert!(!params.use_history);
    }
}
