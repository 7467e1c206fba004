//! Anthropic API client struct and builder.

use std::future::Future;

use augment_core::{Provider, ProviderError, ProviderRequest, ProviderResponse, ToolSchema};

use crate::config::{AnthropicConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::{map_http_status, map_reqwest_error};
use crate::mapping::{from_api_response, is_valid_tool_name, to_api_request};

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API.
///
/// Implements [`Provider`] for use anywhere a provider is accepted.
///
/// # Example
///
/// ```no_run
/// use augment_provider_anthropic::Anthropic;
///
/// let client = Anthropic::new("sk-ant-...")
///     .model("claude-3-7-sonnet-latest")
///     .base_url("https://api.anthropic.com");
/// ```
pub struct Anthropic {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl Anthropic {
    /// Create a client with the given API key, default model and base URL.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from configuration, resolving the API key.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Authentication`] when no key is configured and
    /// `ANTHROPIC_API_KEY` is unset.
    pub fn from_config(config: &AnthropicConfig) -> Result<Self, ProviderError> {
        Ok(Self::new(config.resolve_api_key()?)
            .model(config.default_model.clone())
            .base_url(config.base_url.clone()))
    }

    /// Override the default model.
    ///
    /// This is used when [`ProviderRequest::model`] is unset.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (mock servers, proxies).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// The default model.
    pub fn default_model(&self) -> &str {
        &self.model
    }

    pub(crate) fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

impl Provider for Anthropic {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn invoke(
        &self,
        request: ProviderRequest,
    ) -> impl Future<Output = Result<ProviderResponse, ProviderError>> + Send {
        let url = self.messages_url();
        let api_key = self.api_key.clone();
        let default_model = self.model.clone();
        let http_client = self.client.clone();

        async move {
            let body = to_api_request(&request, &default_model);

            tracing::debug!(
                url = %url,
                model = %body["model"],
                messages = request.messages.len(),
                tools = request.tools.len(),
                "augment.anthropic.request"
            );

            let response = http_client
                .post(&url)
                .header("x-api-key", &api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            let status = response.status();
            let response_text = response.text().await.map_err(map_reqwest_error)?;

            if !status.is_success() {
                tracing::debug!(status = status.as_u16(), "augment.anthropic.error_status");
                return Err(map_http_status(status, &response_text));
            }

            let json: serde_json::Value = serde_json::from_str(&response_text).map_err(|e| {
                ProviderError::InvalidResponse(format!("invalid JSON response: {e}"))
            })?;

            let parsed = from_api_response(&json)?;
            tracing::debug!(
                id = %parsed.id,
                stop_reason = %parsed.stop_reason.as_str(),
                input_tokens = parsed.usage.input_tokens,
                output_tokens = parsed.usage.output_tokens,
                "augment.anthropic.response"
            );
            Ok(parsed)
        }
    }

    /// Drop tools whose names the Messages API rejects.
    fn describe_tools(&self, tools: &[ToolSchema]) -> Vec<ToolSchema> {
        tools
            .iter()
            .filter(|tool| {
                let ok = is_valid_tool_name(&tool.name);
                if !ok {
                    tracing::warn!(tool = %tool.name, "augment.anthropic.tool_name_rejected");
                }
                ok
            })
            .cloned()
            .collect()
    }
}
