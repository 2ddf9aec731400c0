//! OpenAI-compatible HTTP plumbing and the embedding provider built on it.
//!
//! This module is only available when the `openai` feature is enabled. The
//! same [`ApiClient`] backs [`ChatCompletionProvider`](crate::chat::ChatCompletionProvider),
//! so any server speaking the OpenAI wire format (OpenAI, Groq, a local
//! gateway) works for both embeddings and answers.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Authenticated JSON client for one OpenAI-compatible base URL.
pub(crate) struct ApiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ApiClient {
    pub(crate) fn new(http: reqwest::Client, api_key: String, base_url: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RagError::ConfigError("API key must not be empty".into()));
        }
        Ok(Self { http, api_key, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// POST `body` to `{base_url}/{endpoint}` and decode the JSON reply.
    ///
    /// The error is a human-readable message; callers wrap it in their own
    /// [`RagError`] variant.
    pub(crate) async fn post<B, R>(&self, endpoint: &str, body: &B) -> std::result::Result<R, String>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}/{endpoint}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(%endpoint, error = %e, "request failed");
                format!("request failed: {e}")
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%endpoint, %status, "API error");
            return Err(format!("API returned {status}: {}", error_detail(body)));
        }

        response.json::<R>().await.map_err(|e| {
            error!(%endpoint, error = %e, "failed to parse response");
            format!("failed to parse response: {e}")
        })
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// The provider's `error.message` if the body carries one, else the raw body.
pub(crate) fn error_detail(body: String) -> String {
    serde_json::from_str::<ErrorEnvelope>(&body).map(|e| e.error.message).unwrap_or(body)
}

/// An [`EmbeddingProvider`] calling an OpenAI-compatible `/embeddings` endpoint.
///
/// Defaults to `text-embedding-3-small` (1536 dimensions) on the OpenAI API.
pub struct OpenAIEmbeddingProvider {
    api: ApiClient,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbeddingProvider {
    /// Create a provider for the OpenAI API with the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, OPENAI_BASE_URL)
    }

    /// Create a provider for another OpenAI-compatible server.
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(reqwest::Client::new(), api_key.into(), base_url)?,
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    /// Read `OPENAI_API_KEY` and the optional `OPENAI_BASE_URL`,
    /// `OPENAI_EMBEDDING_MODEL` and `OPENAI_EMBEDDING_DIMENSIONS`.
    ///
    /// The model and the dimensions override the defaults independently.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the key is missing or the
    /// dimensions are not a positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("OPENAI_API_KEY")
            .ok_or_else(|| RagError::ConfigError("OPENAI_API_KEY must be set".into()))?;
        let base_url = var("OPENAI_BASE_URL").unwrap_or_else(|| OPENAI_BASE_URL.to_string());
        let mut provider = Self::with_base_url(api_key, &base_url)?;

        if let Some(model) = var("OPENAI_EMBEDDING_MODEL") {
            provider.model = model;
        }
        if let Some(raw) = var("OPENAI_EMBEDDING_DIMENSIONS") {
            provider.dimensions = raw.trim().parse::<usize>().ok().filter(|d| *d > 0).ok_or_else(|| {
                RagError::ConfigError(format!("OPENAI_EMBEDDING_DIMENSIONS has invalid value '{raw}'"))
            })?;
        }
        Ok(provider)
    }

    /// Use another model; `dimensions` must match what it returns.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    fn failure(message: String) -> RagError {
        RagError::EmbeddingError { provider: "OpenAI".into(), message }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])
            .await?
            .pop()
            .ok_or_else(|| Self::failure("API returned no embedding".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(provider = "OpenAI", batch_size = texts.len(), model = %self.model, "embedding batch");

        let request = EmbeddingRequest { model: &self.model, input: texts };
        let mut response: EmbeddingResponse =
            self.api.post("embeddings", &request).await.map_err(Self::failure)?;

        if response.data.len() != texts.len() {
            return Err(Self::failure(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }
        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_message_is_extracted() {
        let body = r#"{"error":{"message":"model not found"}}"#.to_string();
        assert_eq!(error_detail(body), "model not found");
        assert_eq!(error_detail("plain".into()), "plain");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let api = ApiClient::new(reqwest::Client::new(), "key".into(), "http://localhost:8080/v1/").unwrap();
        assert_eq!(api.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn blank_key_is_rejected() {
        assert!(matches!(OpenAIEmbeddingProvider::new("  "), Err(RagError::ConfigError(_))));
    }

    #[test]
    fn embeddings_are_returned_in_input_order() {
        let raw = r#"{"data":[{"index":1,"embedding":[0.0,1.0]},{"index":0,"embedding":[1.0,0.0]}]}"#;
        let mut parsed: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        parsed.data.sort_by_key(|d| d.index);
        assert_eq!(parsed.data[0].embedding, vec![1.0, 0.0]);
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn dimensions_apply_without_a_model_override() {
        let provider = OpenAIEmbeddingProvider::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "key"),
            ("OPENAI_EMBEDDING_DIMENSIONS", "512"),
        ]))
        .unwrap();
        assert_eq!(provider.model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(provider.dimensions(), 512);
    }

    #[test]
    fn model_override_keeps_default_dimensions() {
        let provider = OpenAIEmbeddingProvider::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "key"),
            ("OPENAI_EMBEDDING_MODEL", "text-embedding-3-large"),
        ]))
        .unwrap();
        assert_eq!(provider.model, "text-embedding-3-large");
        assert_eq!(provider.dimensions(), DEFAULT_EMBEDDING_DIMENSIONS);
    }

    #[test]
    fn invalid_dimensions_are_a_config_error() {
        let result = OpenAIEmbeddingProvider::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "key"),
            ("OPENAI_EMBEDDING_DIMENSIONS", "0"),
        ]));
        assert!(matches!(result, Err(RagError::ConfigError(ref m)) if m.contains("'0'")));
    }
}
