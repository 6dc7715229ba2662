//! Upstream chat-completion client
//!
//! The search service talks to an OpenAI-compatible `/chat/completions`
//! endpoint (Perplexity by default) through the [`CompletionClient`] trait so
//! tests and the CLI can swap in their own implementation.

use std::time::Duration;

use async_trait::async_trait;
use prospect_core::{ImageRef, ProspectError, Result, UpstreamConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::prompt::SearchPrompt;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub return_images: bool,
}

impl CompletionRequest {
    /// System and user messages from a prompt, with upstream defaults
    pub fn from_prompt(prompt: SearchPrompt, config: &UpstreamConfig) -> Self {
        Self {
            messages: vec![Message::system(prompt.system), Message::user(prompt.user)],
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            return_images: false,
        }
    }

    pub fn with_images(mut self) -> Self {
        self.return_images = true;
        self
    }
}

/// Text of the first choice plus any images upstream attached
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub images: Vec<ImageRef>,
}

/// Chat-completion backend
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;
}

// ============================================================================
// Perplexity Client
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    return_images: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    images: Option<Vec<ImageRef>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Perplexity (or any OpenAI-compatible) chat-completion client
#[derive(Debug, Clone)]
pub struct PerplexityClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl PerplexityClient {
    /// Create a new client with a per-request timeout
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProspectError::ConfigError(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: "https://api.perplexity.ai".to_string(),
            model: model.into(),
        })
    }

    /// Create from config; fails without an API key
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;
        Ok(Self::new(
            api_key,
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_base_url(config.base_url.clone()))
    }

    /// Set custom base URL (for proxies or compatible APIs)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for PerplexityClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let body = ChatRequest {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            return_images: request.return_images,
        };

        tracing::debug!(
            model = %self.model,
            return_images = request.return_images,
            "Calling upstream"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProspectError::Transport(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %details, "Upstream returned an error");
            return Err(upstream_error(status.as_u16(), status.canonical_reason(), &details));
        }

        let payload = response
            .bytes()
            .await
            .map_err(|e| ProspectError::Transport(format!("Failed to read response: {e}")))?;

        parse_completion(&payload)
    }
}

/// Error for a non-success upstream status
pub fn upstream_error(status: u16, reason: Option<&str>, details: &str) -> ProspectError {
    ProspectError::Upstream {
        status,
        message: format!(
            "Upstream API error: {}. Details: {details}",
            reason.unwrap_or("Unknown Status")
        ),
    }
}

fn parse_completion(payload: &[u8]) -> Result<Completion> {
    let parsed: ChatResponse = serde_json::from_slice(payload)
        .map_err(|e| ProspectError::InvalidResponse(format!("Failed to parse response: {e}")))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProspectError::InvalidResponse("No completion content".to_string()))?;

    Ok(Completion {
        content,
        images: parsed.images.unwrap_or_default(),
    })
}

// ============================================================================
// Tests
// ============================================================================
