//! Caller-facing session API.

use crate::config::SessionConfig;
use crate::context::SessionContext;
use crate::error::{SessionError, StructuredError};
use crate::orchestrator::{SessionOutcome, TurnOrchestrator};
use crate::structured::extract_structured;
use augment_core::{Message, Prompt, Provider, ProviderResponse, RequestParams, Role, render_message};
use augment_history::{
    ConversationHistory, ExportError, ExportReport, SaveHistoryCommand, TranscriptFormat,
};
use augment_hooks::{Observer, ObserverRegistry};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A conversation with one provider: an orchestrator plus the history it
/// replays and reconciles.
///
/// Every entry point takes `&mut self`, so one history is never driven by
/// two sessions at once.
pub struct Session<P: Provider> {
    orchestrator: TurnOrchestrator<P>,
    history: ConversationHistory,
    params: RequestParams,
    observers: ObserverRegistry,
    transcript_format: TranscriptFormat,
    cancel: CancellationToken,
}

impl<P: Provider> Session<P> {
    /// Create a session with default parameters and an empty history.
    pub fn new(orchestrator: TurnOrchestrator<P>) -> Self {
        Self {
            orchestrator,
            history: ConversationHistory::new(),
            params: RequestParams::default(),
            observers: ObserverRegistry::new(),
            transcript_format: TranscriptFormat::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Create a session from a loaded configuration.
    pub fn from_config(orchestrator: TurnOrchestrator<P>, config: SessionConfig) -> Self {
        Self::new(orchestrator.with_config(config.orchestrator))
            .with_params(config.params)
            .with_transcript_format(config.transcript)
    }

    /// Set the default request parameters.
    #[must_use]
    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Start from an existing history.
    #[must_use]
    pub fn with_history(mut self, history: ConversationHistory) -> Self {
        self.history = history;
        self
    }

    /// Add an observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.add(observer);
        self
    }

    /// Set the transcript export delimiters.
    #[must_use]
    pub fn with_transcript_format(mut self, format: TranscriptFormat) -> Self {
        self.transcript_format = format;
        self
    }

    /// Default request parameters.
    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    /// Stored history.
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Stored history, mutably.
    pub fn history_mut(&mut self) -> &mut ConversationHistory {
        &mut self.history
    }

    /// The orchestrator.
    pub fn orchestrator(&self) -> &TurnOrchestrator<P> {
        &self.orchestrator
    }

    /// Token that cancels the session in flight.
    ///
    /// Once fired, the session arms a fresh token as soon as the current call
    /// returns, whatever its result; fetch it again to cancel later calls.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run a session and return every raw provider reply.
    ///
    /// # Errors
    ///
    /// See [`TurnOrchestrator::run`].
    pub async fn generate(
        &mut self,
        prompt: impl Into<Prompt>,
    ) -> Result<Vec<ProviderResponse>, SessionError> {
        let params = self.params.clone();
        Ok(self.run(prompt.into(), params).await?.responses)
    }

    /// Run a session with explicit parameters and return the full outcome.
    ///
    /// # Errors
    ///
    /// See [`TurnOrchestrator::run`].
    pub async fn generate_with(
        &mut self,
        prompt: impl Into<Prompt>,
        params: RequestParams,
    ) -> Result<SessionOutcome, SessionError> {
        self.run(prompt.into(), params).await
    }

    /// Run a session and return the text of every reply, newline-joined.
    ///
    /// A text prompt of the form `***SAVE_HISTORY <path>` exports the history
    /// instead and returns a status line; no provider call is made.
    ///
    /// # Errors
    ///
    /// See [`TurnOrchestrator::run`].
    pub async fn generate_text(&mut self, prompt: impl Into<Prompt>) -> Result<String, SessionError> {
        let prompt = prompt.into();
        if let Some(command) = prompt.as_text().and_then(SaveHistoryCommand::parse) {
            return Ok(self.run_save_command(command).await);
        }
        let params = self.params.clone();
        Ok(self.run(prompt, params).await?.text())
    }

    /// Run a session and read its text as `T`.
    ///
    /// Returns `Ok(None)` when the session produced no text.
    ///
    /// # Errors
    ///
    /// [`StructuredError::Session`] when the session fails and
    /// [`StructuredError::Parse`] when the text is not a `T`.
    pub async fn generate_structured<T: DeserializeOwned>(
        &mut self,
        prompt: impl Into<Prompt>,
    ) -> Result<Option<T>, StructuredError> {
        let params = self.params.clone();
        let outcome = self.run(prompt.into(), params).await?;
        extract_structured(&outcome.text())
    }

    /// Write the full history to `path` in the delimited transcript format.
    ///
    /// # Errors
    ///
    /// [`ExportError::Io`] when the file cannot be written.
    pub async fn save_history(&self, path: &Path) -> Result<ExportReport, ExportError> {
        self.history.export(path, &self.transcript_format).await
    }

    /// Apply prompt-template messages.
    ///
    /// When the last message is from the user, the earlier ones join the
    /// prompt segment and a reply to the last one is generated. When it is
    /// from the assistant, all of them join the prompt segment and the last
    /// message's text is returned without calling the provider.
    ///
    /// # Errors
    ///
    /// See [`TurnOrchestrator::run`].
    pub async fn apply_prompt_template(
        &mut self,
        mut messages: Vec<Message>,
    ) -> Result<String, SessionError> {
        let Some(last) = messages.pop() else {
            return Ok(String::new());
        };
        tracing::debug!(
            messages = messages.len() + 1,
            last_role = %last.role,
            "augment.session.apply_prompt_template"
        );
        match last.role {
            Role::User => {
                self.history.extend(messages, true);
                let params = self.params.clone();
                Ok(self.run(Prompt::Messages(vec![last]), params).await?.text())
            }
            Role::Assistant => {
                let text = render_message(&last);
                messages.push(last);
                self.history.extend(messages, true);
                Ok(text)
            }
        }
    }

    async fn run(
        &mut self,
        prompt: Prompt,
        params: RequestParams,
    ) -> Result<SessionOutcome, SessionError> {
        let use_history = params.use_history;
        let mut transcript = self.history.get(use_history);
        transcript.extend(prompt.into_messages());

        let ctx = SessionContext::new(params)
            .with_observers(self.observers.clone())
            .with_cancellation(self.cancel.clone());

        let result = self.orchestrator.run(transcript, &ctx).await;
        // A cancel that lands after the loop's last check still fires the token.
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        let outcome = result?;
        if use_history {
            self.history.reconcile(&outcome.transcript);
        }
        Ok(outcome)
    }

    async fn run_save_command(&self, command: Result<SaveHistoryCommand, ExportError>) -> String {
        let command = match command {
            Ok(command) => command,
            Err(_) => return SaveHistoryCommand::usage(),
        };
        match self.save_history(&command.path).await {
            Ok(report) => {
                tracing::info!(
                    path = %report.path.display(),
                    messages = report.messages,
                    placeholders = report.placeholders.len(),
                    "augment.session.history_saved"
                );
                format!(
                    "Done. Saved conversation history to {}",
                    command.path.display()
                )
            }
            Err(e) => {
                tracing::warn!(error = %e, "augment.session.history_save_failed");
                format!("Error saving history: {e}")
            }
        }
    }
}
