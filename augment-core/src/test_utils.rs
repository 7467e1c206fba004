//! Scripted provider for tests.
//!
//! Available behind the `test-utils` feature flag.

use crate::provider::{Provider, ProviderError};
use crate::types::{ContentBlock, ProviderRequest, ProviderResponse, Role, StopReason, TokenUsage};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A provider that replays queued outcomes in order and records every
/// request it receives. An exhausted script yields `InvalidResponse`.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
    call_count: AtomicUsize,
}

impl ScriptedProvider {
    /// Create an empty script.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a script from a list of responses.
    pub fn with_responses(responses: impl IntoIterator<Item = ProviderResponse>) -> Self {
        let provider = Self::new();
        for response in responses {
            provider.push_response(response);
        }
        provider
    }

    /// Queue a successful response.
    pub fn push_response(&self, response: ProviderResponse) {
        self.script.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: ProviderError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Number of `invoke` calls so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every request received.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::InvalidResponse("script exhausted".into())))
    }
}

/// A response with explicit content and stop reason.
pub fn response(content: Vec<ContentBlock>, stop_reason: StopReason) -> ProviderResponse {
    ProviderResponse {
        id: "msg_test".into(),
        model: "test-model".into(),
        role: Role::Assistant,
        content,
        stop_reason,
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

/// An `end_turn` response holding one text block.
pub fn text_response(text: &str) -> ProviderResponse {
    response(vec![ContentBlock::text(text)], StopReason::EndTurn)
}

/// A `tool_use` response requesting one tool.
pub fn tool_use_response(id: &str, name: &str, input: serde_json::Value) -> ProviderResponse {
    response(
        vec![ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }],
        StopReason::ToolUse,
    )
}
