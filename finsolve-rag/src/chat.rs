//! OpenAI-compatible chat completion provider (Groq by default).
//!
//! This module is only available when the `openai` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GenerationConfig;
use crate::error::{RagError, Result};
use crate::generation::CompletionProvider;
use crate::openai::ApiClient;

/// A [`CompletionProvider`] speaking the `/chat/completions` wire format.
///
/// Each prompt is sent as a single user message; the content of the first
/// choice is returned unchanged.
pub struct ChatCompletionProvider {
    api: ApiClient,
}

impl ChatCompletionProvider {
    /// Create a provider for `base_url` (e.g. `https://api.groq.com/openai/v1`).
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        Ok(Self { api: ApiClient::new(reqwest::Client::new(), api_key.into(), base_url)? })
    }

    /// Create a provider from validated generation settings.
    ///
    /// The HTTP client timeout mirrors the generation timeout so a stalled
    /// connection is torn down rather than left open.
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build().map_err(|e| {
            RagError::ConfigError(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self { api: ApiClient::new(http, config.api_key.clone(), &config.base_url)? })
    }

    fn failure(message: String) -> RagError {
        RagError::GenerationError { provider: "chat-completions".into(), message }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for ChatCompletionProvider {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn complete(&self, model: &str, prompt: &str, temperature: f32) -> Result<String> {
        let body = ChatRequest {
            model,
            temperature,
            messages: [ChatMessage { role: "user", content: prompt }],
        };

        let parsed: ChatResponse =
            self.api.post("chat/completions", &body).await.map_err(Self::failure)?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Self::failure("response contained no completion".into()))?;

        debug!(%model, answer_len = text.len(), "completion received");
        Ok(text)
    }
}
