//! Process-wide resource handles built once during startup.

use std::sync::Arc;

use tracing::info;

use crate::config::{EmbedderKind, Settings};
use crate::embedding::{EmbeddingProvider, HashingEmbeddingProvider};
use crate::error::{RagError, Result};
use crate::generation::CompletionProvider;
use crate::inmemory::InMemoryVectorStore;
use crate::vectorstore::VectorStore;

/// Shared clients handed to every component by the [`Gateway`](crate::Gateway)
/// builder instead of living in globals.
#[derive(Clone)]
pub struct Resources {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub store: Arc<dyn VectorStore>,
    pub completion: Arc<dyn CompletionProvider>,
}

impl Resources {
    /// Construct the embedding provider, vector store and completion provider
    /// selected by `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a selected backend was not compiled
    /// in, or if a backend rejects its configuration.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let embedder = build_embedder(settings.embedder)?;
        let store = build_store(settings.qdrant_url.as_deref())?;
        let completion = build_completion(settings)?;
        info!(
            embedder = ?settings.embedder,
            dimensions = embedder.dimensions(),
            qdrant = settings.qdrant_url.is_some(),
            model = %settings.generation.model,
            "resources initialized"
        );
        Ok(Self { embedder, store, completion })
    }
}

#[cfg(not(all(feature = "openai", feature = "qdrant", feature = "fastembed")))]
fn not_compiled(feature: &str) -> RagError {
    RagError::ConfigError(format!("this build does not include the '{feature}' feature"))
}

fn build_embedder(kind: EmbedderKind) -> Result<Arc<dyn EmbeddingProvider>> {
    match kind {
        EmbedderKind::Hashing => Ok(Arc::new(HashingEmbeddingProvider::default())),
        #[cfg(feature = "openai")]
        EmbedderKind::OpenAI => Ok(Arc::new(crate::openai::OpenAIEmbeddingProvider::from_env()?)),
        #[cfg(not(feature = "openai"))]
        EmbedderKind::OpenAI => Err(not_compiled("openai")),
        #[cfg(feature = "fastembed")]
        EmbedderKind::FastEmbed => Ok(Arc::new(crate::minilm::FastEmbedProvider::new()?)),
        #[cfg(not(feature = "fastembed"))]
        EmbedderKind::FastEmbed => Err(not_compiled("fastembed")),
    }
}

fn build_store(qdrant_url: Option<&str>) -> Result<Arc<dyn VectorStore>> {
    match qdrant_url {
        None => Ok(Arc::new(InMemoryVectorStore::new())),
        #[cfg(feature = "qdrant")]
        Some(url) => Ok(Arc::new(crate::qdrant::QdrantVectorStore::connect(url).map_err(|e| {
            RagError::ConfigError(format!("invalid QDRANT_URL '{url}': {e}"))
        })?)),
        #[cfg(not(feature = "qdrant"))]
        Some(_) => Err(not_compiled("qdrant")),
    }
}

#[cfg(feature = "openai")]
fn build_completion(settings: &Settings) -> Result<Arc<dyn CompletionProvider>> {
    Ok(Arc::new(crate::chat::ChatCompletionProvider::from_config(&settings.generation)?))
}

#[cfg(not(feature = "openai"))]
fn build_completion(_settings: &Settings) -> Result<Arc<dyn CompletionProvider>> {
    Err(not_compiled("openai"))
}
