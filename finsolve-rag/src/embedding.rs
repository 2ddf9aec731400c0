//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends that support native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use finsolve_rag::EmbeddingProvider;
///
/// let provider = HashingEmbeddingProvider::default();
/// let embedding = provider.embed("quarterly revenue").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Default dimensionality, matching all-MiniLM-L6-v2.
pub const DEFAULT_HASHING_DIMENSIONS: usize = 384;

/// Deterministic, offline embeddings from feature-hashed tokens.
///
/// Text is lowercased and split on non-alphanumeric characters. Each token is
/// hashed with 64-bit FNV-1a; the hash selects a bucket and its top bit a sign.
/// The bucket counts are L2-normalized, so cosine similarity reflects shared
/// vocabulary. Texts without tokens embed to the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    /// Create a provider producing `dimensions`-sized vectors.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `dimensions` is zero.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(RagError::ConfigError("embedding dimensions must be non-zero".into()));
        }
        Ok(Self { dimensions })
    }

    fn hash(token: &str) -> u64 {
        token.bytes().fold(FNV_OFFSET, |acc, b| (acc ^ u64::from(b)).wrapping_mul(FNV_PRIME))
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let hash = Self::hash(token);
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbeddingProvider {
    fn default() -> Self {
        Self { dimensions: DEFAULT_HASHING_DIMENSIONS }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
