//! The turn loop.
//!
//! [`TurnOrchestrator::run`] drives one session through
//! build request → invoke → classify → execute tools → repeat, bounded by
//! `max_iterations`. Only fatal provider failures and cancellation end a
//! session with an error. Everything else is folded into the transcript.

use crate::config::{OrchestratorConfig, ToolExecution};
use crate::context::SessionContext;
use crate::error::SessionError;
use augment_core::{
    ContentBlock, ErrorClass, Message, NoTools, Provider, ProviderError, ProviderRequest,
    ProviderResponse, RequestParams, Role, StopReason, Termination, TokenUsage, ToolCall,
    ToolCatalog, ToolInvoker, ToolSchema, tool_result_block, tool_results_message,
};
use augment_hooks::SessionEvent;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::Instrument;

const TOOL_CALLS_NOTICE: &str = "the assistant requested tool calls";

/// Result of one completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    /// Full working transcript: the seed messages followed by everything
    /// generated during the session.
    pub transcript: Vec<Message>,
    /// Number of seed messages at the start of `transcript`.
    pub initial_len: usize,
    /// Raw provider replies, one per iteration.
    pub responses: Vec<ProviderResponse>,
    /// Provider calls made.
    pub iterations: u32,
    /// How the session ended.
    pub termination: Termination,
    /// Accumulated token usage.
    pub usage: TokenUsage,
}

impl SessionOutcome {
    /// Messages produced during the session.
    pub fn generated(&self) -> &[Message] {
        &self.transcript[self.initial_len.min(self.transcript.len())..]
    }

    /// Text of every reply that has any, joined with newlines.
    pub fn text(&self) -> String {
        self.responses
            .iter()
            .map(ProviderResponse::text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What to do after a reply.
enum Step {
    Finish {
        termination: Termination,
        notice: Option<String>,
    },
    RunTools(Vec<ToolCall>),
}

/// Drives the provider/tool loop for one session at a time.
///
/// Generic over `P: Provider` (not object-safe). Tools are reached only
/// through the [`ToolCatalog`] and [`ToolInvoker`] trait objects.
pub struct TurnOrchestrator<P: Provider> {
    provider: P,
    catalog: Arc<dyn ToolCatalog>,
    invoker: Arc<dyn ToolInvoker>,
    config: OrchestratorConfig,
}

impl<P: Provider> TurnOrchestrator<P> {
    /// Create an orchestrator with no tools.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            catalog: Arc::new(NoTools),
            invoker: Arc::new(NoTools),
            config: OrchestratorConfig::default(),
        }
    }

    /// Use one object as both catalog and invoker.
    #[must_use]
    pub fn with_tools<T>(mut self, tools: Arc<T>) -> Self
    where
        T: ToolCatalog + ToolInvoker + 'static,
    {
        let catalog: Arc<dyn ToolCatalog> = tools.clone();
        let invoker: Arc<dyn ToolInvoker> = tools;
        self.catalog = catalog;
        self.invoker = invoker;
        self
    }

    /// Replace the tool catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn ToolCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the tool invoker.
    #[must_use]
    pub fn with_invoker(mut self, invoker: Arc<dyn ToolInvoker>) -> Self {
        self.invoker = invoker;
        self
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// The provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one session starting from `initial`.
    ///
    /// `initial` is the seed transcript (stored history, if any, followed by
    /// the new prompt messages). Returns the final transcript and every raw
    /// reply.
    ///
    /// # Errors
    ///
    /// `SessionError::Auth` when the provider rejects the credentials,
    /// `SessionError::Provider` when the provider classifies some other
    /// failure as fatal, and `SessionError::Cancelled` when `ctx.cancel`
    /// fires. Provider failures classified as recoverable, tool failures and
    /// unknown stop reasons never produce an error.
    pub async fn run(
        &self,
        initial: Vec<Message>,
        ctx: &SessionContext,
    ) -> Result<SessionOutcome, SessionError> {
        self.run_inner(initial, ctx)
            .instrument(ctx.span.clone())
            .await
    }

    async fn run_inner(
        &self,
        initial: Vec<Message>,
        ctx: &SessionContext,
    ) -> Result<SessionOutcome, SessionError> {
        let params = &ctx.params;
        let mut transcript = initial;
        let initial_len = transcript.len();
        let mut responses: Vec<ProviderResponse> = Vec::new();
        let mut usage = TokenUsage::default();
        let mut iterations: u32 = 0;
        let mut call_ids: HashSet<String> = transcript
            .iter()
            .flat_map(Message::tool_calls)
            .map(|call| call.id)
            .collect();

        if let Some(last) = transcript.last() {
            ctx.observers
                .dispatch(&SessionEvent::UserMessage {
                    message: last.clone(),
                    chat_turn: chat_turn(transcript.len()),
                    model: params.model.clone(),
                })
                .await;
        }

        let mut revision = self.catalog.revision();
        let mut tools = self.catalog.list_tools().await;
        tracing::info!(
            provider = self.provider.name(),
            messages = initial_len,
            tools = tools.len(),
            "augment.session.start"
        );

        let termination = loop {
            if iterations >= params.max_iterations {
                tracing::warn!(iterations, "augment.loop.max_iterations");
                break Termination::MaxIterations;
            }
            if ctx.cancel.is_cancelled() {
                return Err(SessionError::Cancelled);
            }
            iterations += 1;

            let current = self.catalog.revision();
            if current != revision {
                tools = self.catalog.list_tools().await;
                revision = current;
                tracing::debug!(revision, tools = tools.len(), "augment.tools.relisted");
            }

            ctx.observers
                .dispatch(&SessionEvent::TurnStarted {
                    iteration: iterations,
                    chat_turn: chat_turn(transcript.len()),
                    model: params.model.clone(),
                })
                .await;

            let request = self.build_request(&transcript, &tools, params);
            tracing::debug!(
                iteration = iterations,
                messages = request.messages.len(),
                tools = request.tools.len(),
                "augment.provider.request"
            );

            let result = tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => return Err(SessionError::Cancelled),
                result = self.provider.invoke(request) => result,
            };

            let (mut response, recovered) = match result {
                Ok(response) => (response, false),
                Err(error) => match self.provider.classify_error(&error) {
                    ErrorClass::Fatal => {
                        tracing::error!(
                            provider = self.provider.name(),
                            error = %error,
                            "augment.provider.fatal"
                        );
                        return Err(if error.is_auth() {
                            SessionError::Auth(error.to_string())
                        } else {
                            SessionError::Provider(error)
                        });
                    }
                    ErrorClass::Recoverable => {
                        tracing::error!(
                            provider = self.provider.name(),
                            error = %error,
                            "augment.provider.recovered"
                        );
                        (synthetic_error_response(&error), true)
                    }
                },
            };

            dedupe_call_ids(&mut response, &mut call_ids);
            usage.accumulate(&response.usage);
            tracing::debug!(
                stop_reason = response.stop_reason.as_str(),
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "augment.provider.response"
            );

            let message = response.to_message();
            let text = message.text();
            let model = response.model.clone();
            let step = if recovered {
                Step::Finish {
                    termination: Termination::ProviderError,
                    notice: None,
                }
            } else {
                classify(&response.stop_reason, &message, params)
            };
            transcript.push(message);
            responses.push(response);

            match step {
                Step::Finish {
                    termination,
                    notice,
                } => {
                    ctx.observers
                        .dispatch(&SessionEvent::AssistantMessage {
                            text,
                            notice,
                            tool_name: None,
                            chat_turn: chat_turn(transcript.len()),
                            model: Some(model),
                        })
                        .await;
                    break termination;
                }
                Step::RunTools(calls) => {
                    let notice = text.is_empty().then(|| TOOL_CALLS_NOTICE.to_string());
                    ctx.observers
                        .dispatch(&SessionEvent::AssistantMessage {
                            text,
                            notice,
                            tool_name: calls.first().map(|c| c.name.clone()),
                            chat_turn: chat_turn(transcript.len()),
                            model: Some(model),
                        })
                        .await;

                    let results = tokio::select! {
                        biased;
                        _ = ctx.cancel.cancelled() => return Err(SessionError::Cancelled),
                        results = self.execute_tools(&calls, ctx) => results,
                    };
                    transcript.push(tool_results_message(results));
                }
            }
        };

        ctx.observers
            .dispatch(&SessionEvent::SessionFinished {
                termination,
                iterations,
                usage,
            })
            .await;
        tracing::info!(termination = ?termination, iterations, "augment.session.finish");

        Ok(SessionOutcome {
            transcript,
            initial_len,
            responses,
            iterations,
            termination,
            usage,
        })
    }

    fn build_request(
        &self,
        transcript: &[Message],
        tools: &[ToolSchema],
        params: &RequestParams,
    ) -> ProviderRequest {
        ProviderRequest {
            model: params.model.clone(),
            messages: transcript.to_vec(),
            system: params.system_prompt.clone(),
            stop_sequences: params.stop_sequences.clone(),
            tools: self.provider.describe_tools(tools),
            max_tokens: params.max_tokens,
            parallel_tool_calls: params.parallel_tool_calls,
            metadata: params.metadata.clone(),
        }
    }

    /// Run every call, returning results in call order.
    async fn execute_tools(&self, calls: &[ToolCall], ctx: &SessionContext) -> Vec<ContentBlock> {
        match self.config.tool_execution {
            ToolExecution::Concurrent if calls.len() > 1 => {
                futures::future::join_all(calls.iter().map(|call| self.execute_tool(call, ctx)))
                    .await
            }
            _ => {
                let mut results = Vec::with_capacity(calls.len());
                for call in calls {
                    results.push(self.execute_tool(call, ctx).await);
                }
                results
            }
        }
    }

    async fn execute_tool(&self, call: &ToolCall, ctx: &SessionContext) -> ContentBlock {
        ctx.observers
            .dispatch(&SessionEvent::ToolCall { call: call.clone() })
            .await;

        let result = self
            .invoker
            .call(&call.name, call.arguments.clone(), &call.id)
            .await;
        if let Err(e) = &result {
            tracing::warn!(tool = %call.name, call_id = %call.id, error = %e, "augment.tool.error");
        }
        let block = tool_result_block(call, result);

        if let ContentBlock::ToolResult {
            content, is_error, ..
        } = &block
        {
            ctx.observers
                .dispatch(&SessionEvent::ToolResult {
                    call_id: call.id.clone(),
                    name: call.name.clone(),
                    content: content.clone(),
                    is_error: *is_error,
                })
                .await;
        }
        block
    }
}

/// Map a stop reason to the next step.
fn classify(stop_reason: &StopReason, message: &Message, params: &RequestParams) -> Step {
    let done = Step::Finish {
        termination: Termination::Completed,
        notice: None,
    };
    match stop_reason {
        StopReason::EndTurn | StopReason::StopSequence => done,
        StopReason::MaxTokens => Step::Finish {
            termination: Termination::Truncated,
            notice: Some(max_tokens_notice(params.max_tokens)),
        },
        StopReason::ToolUse => {
            let calls = message.tool_calls();
            if calls.is_empty() { done } else { Step::RunTools(calls) }
        }
        StopReason::Other(reason) => {
            let calls = message.tool_calls();
            if calls.is_empty() {
                tracing::debug!(reason = %reason, "augment.loop.unknown_stop_reason");
                done
            } else {
                tracing::warn!(reason = %reason, tools = calls.len(), "augment.loop.unknown_stop_reason_with_tools");
                Step::RunTools(calls)
            }
        }
    }
}

fn max_tokens_notice(max_tokens: Option<u32>) -> String {
    match max_tokens {
        Some(limit) => format!("the assistant has reached the maximum token limit ({limit})"),
        None => "the assistant has reached the maximum token limit".to_string(),
    }
}

/// The assistant reply standing in for a failed provider call.
pub fn synthetic_error_response(error: &ProviderError) -> ProviderResponse {
    ProviderResponse {
        id: "error".into(),
        model: "error".into(),
        role: Role::Assistant,
        content: vec![ContentBlock::text(format!(
            "Error during generation: {}",
            error.diagnostic()
        ))],
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    }
}

/// Rewrite any `tool_use` id already seen in this session to a fresh one.
fn dedupe_call_ids(response: &mut ProviderResponse, seen: &mut HashSet<String>) {
    for block in &mut response.content {
        if let ContentBlock::ToolUse { id, .. } = block {
            if seen.contains(id.as_str()) {
                let mut n = 1;
                let fresh = loop {
                    let candidate = format!("{id}-{n}");
                    if !seen.contains(&candidate) {
                        break candidate;
                    }
                    n += 1;
                };
                tracing::warn!(original = %id, replacement = %fresh, "augment.loop.duplicate_call_id");
                *id = fresh;
            }
            seen.insert(id.clone());
        }
    }
}

fn chat_turn(transcript_len: usize) -> usize {
    transcript_len.div_ceil(2)
}
