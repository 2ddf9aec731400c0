//! Answer generation through a language-model completion provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::GenerationConfig;
use crate::error::{RagError, Result};

/// A single-turn text completion capability.
///
/// Implementations send `prompt` as one user message to `model` with the
/// given sampling `temperature` and return the first completion's text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name used in errors and logs.
    fn name(&self) -> &str;

    async fn complete(&self, model: &str, prompt: &str, temperature: f32) -> Result<String>;
}

/// Sends composed prompts to a [`CompletionProvider`] with a fixed model,
/// temperature and timeout.
///
/// The provider's text is returned verbatim. Failures are never retried.
pub struct AnswerGenerator {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl AnswerGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &GenerationConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: config.timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate an answer for a composed prompt.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationError`] if the provider fails or does not
    /// answer within the configured timeout.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let provider = self.provider.name().to_string();
        debug!(%provider, model = %self.model, prompt_len = prompt.len(), "requesting completion");

        let call = self.provider.complete(&self.model, prompt, self.temperature);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(RagError::GenerationError { provider, message })) => {
                error!(%provider, %message, "completion failed");
                Err(RagError::GenerationError { provider, message })
            }
            Ok(Err(e)) => {
                error!(%provider, error = %e, "completion failed");
                Err(RagError::GenerationError { provider, message: e.to_string() })
            }
            Err(_) => {
                error!(%provider, timeout_ms = self.timeout.as_millis() as u64, "completion timed out");
                Err(RagError::GenerationError {
                    provider,
                    message: format!("no response within {:?}", self.timeout),
                })
            }
        }
    }
}
