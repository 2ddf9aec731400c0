//! Local all-MiniLM-L6-v2 embeddings via [fastembed](https://docs.rs/fastembed).
//!
//! This module is only available when the `fastembed` feature is enabled.
//! The ONNX model is downloaded to fastembed's cache on first use.

use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Output size of all-MiniLM-L6-v2.
const MINILM_DIMENSIONS: usize = 384;

/// An [`EmbeddingProvider`] running all-MiniLM-L6-v2 on the local CPU.
///
/// Inference is blocking, so batches run on tokio's blocking pool.
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
}

impl FastEmbedProvider {
    /// Load the model, downloading it if it is not cached yet.
    pub fn new() -> Result<Self> {
        let model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
            .map_err(|e| Self::failure(format!("failed to load model: {e}")))?;
        Ok(Self { model: Arc::new(model) })
    }

    fn failure(message: String) -> RagError {
        RagError::EmbeddingError { provider: "fastembed".into(), message }
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Self::failure("model returned no embedding".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "fastembed", batch_size = texts.len(), "embedding batch");
        let model = Arc::clone(&self.model);
        let owned: Vec<String> = texts.iter().map(|t| (*t).to_string()).collect();

        tokio::task::spawn_blocking(move || model.embed(owned, None))
            .await
            .map_err(|e| Self::failure(format!("embedding task failed: {e}")))?
            .map_err(|e| Self::failure(e.to_string()))
    }

    fn dimensions(&self) -> usize {
        MINILM_DIMENSIONS
    }
}
