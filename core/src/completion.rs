//! Chat-completion gateway.
//!
//! One prompt in, one outcome out. The HTTP transport lives behind
//! [`ChatBackend`] so the CLI can plug in reqwest and tests can plug in
//! fakes. Every request is a single attempt with a fixed system persona and
//! no conversation history.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Shown to the user in place of a response whenever a request fails.
pub const ERROR_SENTINEL: &str = "Wystąpił błąd podczas pobierania odpowiedzi.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    #[must_use]
    pub fn new(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

impl ChatResponse {
    pub fn first_choice_text(self) -> Result<String, CompletionError> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(CompletionError::NoChoices)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("completion endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed completion response: {0}")]
    Malformed(String),

    #[error("completion response has no choices")]
    NoChoices,
}

/// Result of one completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Completed(String),
    Failed(CompletionError),
}

impl CompletionOutcome {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, CompletionOutcome::Completed(_))
    }

    /// The text to show the user: the response, or [`ERROR_SENTINEL`].
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            CompletionOutcome::Completed(text) => text,
            CompletionOutcome::Failed(_) => ERROR_SENTINEL,
        }
    }
}

/// Transport for a single chat-completion request.
pub trait ChatBackend: Send + Sync {
    fn send(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, CompletionError>> + Send;
}

/// Shared "request in flight" indicator.
///
/// Clones observe the same flag. UIs can [`subscribe`](Self::subscribe) to
/// render a spinner. A listener channel, if attached, receives every `set`
/// call in order, including repeats the watch channel would coalesce.
#[derive(Clone)]
pub struct LoadingFlag {
    tx: Arc<watch::Sender<bool>>,
    listener: Option<mpsc::UnboundedSender<bool>>,
}

impl Default for LoadingFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingFlag {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            listener: None,
        }
    }

    #[must_use]
    pub fn with_listener(listener: mpsc::UnboundedSender<bool>) -> Self {
        Self {
            listener: Some(listener),
            ..Self::new()
        }
    }

    pub fn set(&self, loading: bool) {
        self.tx.send_replace(loading);
        if let Some(listener) = &self.listener {
            let _ = listener.send(loading);
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

pub struct CompletionGateway<B> {
    backend: B,
    model: String,
    loading: LoadingFlag,
}

impl<B: ChatBackend> CompletionGateway<B> {
    pub fn new(backend: B, model: &str) -> Self {
        Self::with_loading(backend, model, LoadingFlag::new())
    }

    pub fn with_loading(backend: B, model: &str, loading: LoadingFlag) -> Self {
        Self {
            backend,
            model: model.to_string(),
            loading,
        }
    }

    #[must_use]
    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Send `prompt` and return the first choice's text.
    ///
    /// The loading flag is raised before the request and lowered exactly
    /// once afterwards, on success and failure alike. Failures never
    /// propagate as errors; they come back as [`CompletionOutcome::Failed`].
    pub async fn fetch_chat_completion(&self, prompt: &str) -> CompletionOutcome {
        self.loading.set(true);
        let request = ChatRequest::new(&self.model, prompt);
        debug!(model = %self.model, prompt_len = prompt.len(), "sending completion request");

        let outcome = match self.backend.send(&request).await {
            Ok(response) => match response.first_choice_text() {
                Ok(text) => CompletionOutcome::Completed(text),
                Err(e) => {
                    warn!("No choices found in completion response");
                    CompletionOutcome::Failed(e)
                }
            },
            Err(e) => {
                warn!(error = %e, "completion request failed");
                CompletionOutcome::Failed(e)
            }
        };

        self.loading.set(false);
        outcome
    }
}
