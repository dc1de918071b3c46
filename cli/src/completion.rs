use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use tracing::debug;

use larder_core::completion::{ChatBackend, ChatRequest, ChatResponse, CompletionError};

/// reqwest transport for the chat-completion endpoint.
pub struct ChatCompletionClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl ChatCompletionClient {
    pub fn new(url: &str, api_key: &str) -> Result<Self> {
        // No overall request timeout: completions can take a while and the
        // request is never retried.
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "larder-cli/{} (meal planner)",
                env!("CARGO_PKG_VERSION")
            ))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl ChatBackend for ChatCompletionClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, CompletionError> {
        let resp = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        // The gateway logs the failure; only the body is extra detail here.
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(%status, %body, "completion endpoint error body");
            return Err(CompletionError::Status(status.as_u16()));
        }

        resp.json::<ChatResponse>()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))
    }
}
